use crate::maximum::Maximum;
use crate::minimum::Minimum;
use crate::moving_average::MovingAverageType;
use crate::rsi::Rsi;
use crate::state::IndicatorState;
use crate::{BarIndicator, Indicator, IndicatorError};
use rust_decimal::Decimal;
use stochrsi_core::Bar;

/// Stochastic RSI.
///
/// Runs an RSI over the bar closes, tracks the rolling maximum and minimum of
/// that RSI over the same period, and reports
///
/// ```text
/// (RSI / Min) / (Max / Min)
/// ```
///
/// Bars with no volume or no range feed RSI a zero and return the raw RSI.
///
/// When `Min` is zero (or a step overflows) the value falls back to `RSI / Max`,
/// and to zero when `Max` is zero too.
#[derive(Debug, Clone)]
pub struct StochRsi {
    state: IndicatorState,
    period: usize,
    ma_type: MovingAverageType,
    rsi: Rsi,
    max: Maximum,
    min: Minimum,
}

impl StochRsi {
    /// Create with the default name `STORSI(period, ma_type)`.
    pub fn new(period: usize, ma_type: MovingAverageType) -> Result<Self, IndicatorError> {
        Self::with_name(Self::default_name(period, ma_type), period, ma_type)
    }

    pub fn with_name(
        name: impl Into<String>,
        period: usize,
        ma_type: MovingAverageType,
    ) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::InvalidConfiguration(
                "StochRSI period must be > 0".into(),
            ));
        }
        let stoch = Self {
            state: IndicatorState::new(name),
            period,
            ma_type,
            rsi: Rsi::new(period, ma_type)?,
            max: Maximum::new(period)?,
            min: Minimum::new(period)?,
        };
        tracing::debug!(
            indicator = %stoch.state.name(),
            period,
            ma_type = %ma_type,
            "StochRSI created"
        );
        Ok(stoch)
    }

    pub fn default_name(period: usize, ma_type: MovingAverageType) -> String {
        format!("STORSI({}, {})", period, ma_type)
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn moving_average_type(&self) -> MovingAverageType {
        self.ma_type
    }

    pub fn rsi(&self) -> &Rsi {
        &self.rsi
    }

    pub fn max(&self) -> &Maximum {
        &self.max
    }

    pub fn min(&self) -> &Minimum {
        &self.min
    }

    /// Drive RSI, then the extremes from RSI's fresh value.
    fn advance(&mut self, bar: &Bar, input: Decimal) -> Decimal {
        let rsi = self.rsi.update(bar.timestamp, input);
        self.max.update(bar.timestamp, rsi);
        self.min.update(bar.timestamp, rsi);
        rsi
    }
}

/// `(RSI / Min) / (Max / Min)`, or `RSI / Max` when any step is undefined or
/// overflows, or zero when `Max` is zero as well.
fn ratio(rsi: Decimal, max: Decimal, min: Decimal) -> Decimal {
    let stoch = rsi
        .checked_div(min)
        .zip(max.checked_div(min))
        .and_then(|(numerator, denominator)| numerator.checked_div(denominator));

    match stoch {
        Some(value) => value,
        None => {
            tracing::trace!(%rsi, %max, %min, "Ratio undefined, falling back to RSI / Max");
            rsi.checked_div(max).unwrap_or(Decimal::ZERO)
        }
    }
}

impl BarIndicator for StochRsi {
    fn name(&self) -> &str {
        self.state.name()
    }

    fn update(&mut self, bar: &Bar) -> Decimal {
        if !self.state.accept(bar.timestamp) {
            return self.state.current();
        }

        if bar.is_zero_volume() || bar.range().is_zero() {
            tracing::trace!(
                indicator = %self.state.name(),
                time = %bar.timestamp,
                "Degenerate bar, feeding RSI a zero"
            );
            let rsi = self.advance(bar, Decimal::ZERO);
            return self.state.set_current(rsi);
        }

        let rsi = self.advance(bar, bar.close);
        let value = ratio(rsi, self.max.current(), self.min.current());
        self.state.set_current(value)
    }

    fn current(&self) -> Decimal {
        self.state.current()
    }

    fn is_ready(&self) -> bool {
        self.rsi.is_ready() && self.max.is_ready() && self.min.is_ready()
    }

    fn warm_up_period(&self) -> usize {
        self.rsi
            .warm_up_period()
            .max(self.max.warm_up_period())
            .max(self.min.warm_up_period())
    }

    fn samples(&self) -> usize {
        self.state.samples()
    }

    fn reset(&mut self) {
        self.rsi.reset();
        self.max.reset();
        self.min.reset();
        self.state.reset();
        tracing::debug!(indicator = %self.state.name(), "StochRSI reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn t(i: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap() + Duration::minutes(i)
    }

    fn bar(i: i64, close: Decimal) -> Bar {
        Bar::new("ES", t(i), close, close + dec!(1), close - dec!(1), close, dec!(100))
    }

    fn zigzag(n: i64) -> Vec<Bar> {
        let closes = [
            dec!(44.34), dec!(44.09), dec!(44.15), dec!(43.61), dec!(44.33),
            dec!(44.83), dec!(45.10), dec!(45.42), dec!(45.84), dec!(46.08),
            dec!(45.89), dec!(46.03), dec!(45.61), dec!(46.28), dec!(46.28),
            dec!(46.00), dec!(46.03), dec!(46.41), dec!(46.22), dec!(45.64),
        ];
        (0..n)
            .map(|i| bar(i, closes[i as usize % closes.len()]))
            .collect()
    }

    #[test]
    fn test_zero_period_is_rejected() {
        let err = StochRsi::new(0, MovingAverageType::Simple).unwrap_err();
        assert!(matches!(err, IndicatorError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_default_name() {
        let stoch = StochRsi::new(14, MovingAverageType::Simple).unwrap();
        assert_eq!(BarIndicator::name(&stoch), "STORSI(14, Simple)");
        let named = StochRsi::with_name("fast", 5, MovingAverageType::Wilders).unwrap();
        assert_eq!(BarIndicator::name(&named), "fast");
        assert_eq!(named.period(), 5);
        assert_eq!(named.moving_average_type(), MovingAverageType::Wilders);
    }

    #[test]
    fn test_warm_up_is_max_of_children() {
        for period in 1..=6 {
            for ma_type in MovingAverageType::ALL {
                let mut stoch = StochRsi::new(period, ma_type).unwrap();
                assert_eq!(stoch.warm_up_period(), period + 1);
                for (i, b) in zigzag(period as i64 + 3).iter().enumerate() {
                    stoch.update(b);
                    assert_eq!(
                        stoch.is_ready(),
                        i + 1 >= stoch.warm_up_period(),
                        "period {} {:?} after {} bars",
                        period,
                        ma_type,
                        i + 1
                    );
                }
            }
        }
    }

    #[test]
    fn test_rising_closes() {
        let mut stoch = StochRsi::new(14, MovingAverageType::Simple).unwrap();
        let first = stoch.update(&bar(0, dec!(100)));
        // RSI, Max and Min are all zero on the first bar
        assert_eq!(first, Decimal::ZERO);
        for i in 1..15 {
            let value = stoch.update(&bar(i, dec!(100) + Decimal::from(i)));
            assert_eq!(stoch.is_ready(), i == 14);
            assert_eq!(value, Decimal::ONE);
        }
        assert_eq!(stoch.min().current(), dec!(100));
        assert_eq!(stoch.samples(), 15);
    }

    #[test]
    fn test_zero_volume_returns_raw_rsi() {
        let mut stoch = StochRsi::new(3, MovingAverageType::Simple).unwrap();
        for i in 0..5 {
            stoch.update(&bar(i, dec!(10) + Decimal::from(i)));
        }

        let mut shadow = stoch.rsi().clone();
        let expected = shadow.update(t(5), Decimal::ZERO);

        let mut quiet = bar(5, dec!(15));
        quiet.volume = Decimal::ZERO;
        let value = stoch.update(&quiet);

        assert_eq!(value, expected);
        assert_eq!(stoch.rsi().current(), expected);
        assert_eq!(stoch.min().current(), expected);
        assert_eq!(stoch.max().current(), dec!(100));
    }

    #[test]
    fn test_flat_bar_returns_raw_rsi() {
        let mut stoch = StochRsi::new(4, MovingAverageType::Exponential).unwrap();
        for b in zigzag(6) {
            stoch.update(&b);
        }
        let mut shadow = stoch.rsi().clone();
        let expected = shadow.update(t(6), Decimal::ZERO);

        let flat = Bar::new("ES", t(6), dec!(46), dec!(46), dec!(46), dec!(46), dec!(500));
        assert_eq!(stoch.update(&flat), expected);
        assert_eq!(stoch.min().current(), stoch.min().current().min(expected));
    }

    #[test]
    fn test_single_zero_volume_bar() {
        let mut stoch = StochRsi::new(14, MovingAverageType::Simple).unwrap();
        let mut quiet = bar(0, dec!(50));
        quiet.volume = Decimal::ZERO;
        assert_eq!(stoch.update(&quiet), Decimal::ZERO);
        assert_eq!(stoch.rsi().current(), Decimal::ZERO);
    }

    #[test]
    fn test_ratio_formula() {
        let mut stoch = StochRsi::new(5, MovingAverageType::Wilders).unwrap();
        for b in zigzag(20) {
            let value = stoch.update(&b);
            let rsi = stoch.rsi().current();
            let max = stoch.max().current();
            let min = stoch.min().current();
            if min.is_zero() {
                continue;
            }
            assert_eq!(value, (rsi / min) / (max / min));
            assert!(max >= rsi && rsi >= min);
            if max != min {
                assert!(value <= Decimal::ONE + dec!(0.000000000000000000001));
                assert!(value >= min / max - dec!(0.000000000000000000001));
            }
        }
    }

    #[test]
    fn test_ratio_falls_back_when_min_is_tiny() {
        let tiny = dec!(0.0000000000000000000000000001);
        // RSI / Min overflows
        assert!(dec!(50).checked_div(tiny).is_none());
        assert_eq!(ratio(dec!(50), dec!(100), tiny), dec!(0.5));
        assert_eq!(ratio(dec!(50), dec!(100), Decimal::ZERO), dec!(0.5));
        assert_eq!(ratio(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(ratio(dec!(30), dec!(60), dec!(20)), dec!(0.5));
    }

    #[test]
    fn test_huge_closes_with_quiet_bars_do_not_panic() {
        let mut stoch = StochRsi::new(4, MovingAverageType::Simple).unwrap();
        let big = dec!(50000000000000000000000000000);
        let mut last = Decimal::ZERO;
        for i in 0..6 {
            let mut b = Bar::new("BTC", t(i), big, big + dec!(1), big - dec!(1), big, dec!(10));
            if i % 2 == 1 {
                b.volume = Decimal::ZERO;
            }
            last = stoch.update(&b);
        }
        // quiet bars feed RSI zero, so gains and losses alternate evenly
        assert!(stoch.is_ready());
        assert_eq!(last, dec!(50));
        assert_eq!(stoch.rsi().current(), dec!(50));
    }

    #[test]
    fn test_window_bounds_trailing_rsi() {
        let period = 4;
        let mut stoch = StochRsi::new(period, MovingAverageType::Simple).unwrap();
        let mut history = Vec::new();
        for b in zigzag(20) {
            stoch.update(&b);
            history.push(stoch.rsi().current());
            let tail = &history[history.len().saturating_sub(period)..];
            for v in tail {
                assert!(stoch.max().current() >= *v);
                assert!(stoch.min().current() <= *v);
            }
        }
    }

    #[test]
    fn test_reset_replays_identically() {
        let bars = zigzag(20);
        let mut stoch = StochRsi::new(6, MovingAverageType::Exponential).unwrap();
        let first: Vec<Decimal> = bars.iter().map(|b| stoch.update(b)).collect();

        stoch.reset();
        assert!(!stoch.is_ready());
        assert_eq!(stoch.samples(), 0);
        assert_eq!(stoch.current(), Decimal::ZERO);
        assert_eq!(stoch.rsi().samples(), 0);

        let second: Vec<Decimal> = bars.iter().map(|b| stoch.update(b)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reset_before_any_update() {
        let mut stoch = StochRsi::new(3, MovingAverageType::Simple).unwrap();
        stoch.reset();
        assert_eq!(stoch.samples(), 0);
        assert!(!stoch.is_ready());
    }

    #[test]
    fn test_out_of_order_bar_is_ignored() {
        let mut stoch = StochRsi::new(3, MovingAverageType::Simple).unwrap();
        stoch.update(&bar(0, dec!(10)));
        let latest = stoch.update(&bar(2, dec!(12)));
        let stale = stoch.update(&bar(1, dec!(11)));
        assert_eq!(stale, latest);
        assert_eq!(stoch.samples(), 2);
        assert_eq!(stoch.rsi().samples(), 2);
    }
}
