use crate::moving_average::{MovingAverage, MovingAverageType};
use crate::state::IndicatorState;
use crate::{Indicator, IndicatorError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Relative Strength Index (RSI).
/// Average gain/loss are smoothed with the configured moving average.
#[derive(Debug, Clone)]
pub struct Rsi {
    state: IndicatorState,
    len: usize,
    ma_type: MovingAverageType,
    prev_value: Option<Decimal>,
    avg_gain: MovingAverage,
    avg_loss: MovingAverage,
}

impl Rsi {
    pub fn new(period: usize, ma_type: MovingAverageType) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::InvalidConfiguration(
                "RSI period must be > 0".into(),
            ));
        }
        Ok(Self {
            state: IndicatorState::new(format!("RSI({}, {})", period, ma_type)),
            len: period,
            ma_type,
            prev_value: None,
            avg_gain: ma_type.create(period)?,
            avg_loss: ma_type.create(period)?,
        })
    }

    pub fn period(&self) -> usize {
        self.len
    }

    pub fn moving_average_type(&self) -> MovingAverageType {
        self.ma_type
    }

    pub fn average_gain(&self) -> Decimal {
        self.avg_gain.current()
    }

    pub fn average_loss(&self) -> Decimal {
        self.avg_loss.current()
    }

    fn compute(&self) -> Decimal {
        if self.avg_gain.samples() == 0 {
            return Decimal::ZERO;
        }
        let ag = self.avg_gain.current();
        let al = self.avg_loss.current();
        if al.is_zero() {
            return dec!(100);
        }
        // A vanishing loss next to a large gain overflows `rs`; the limit is 100.
        ag.checked_div(al)
            .and_then(|rs| rs.checked_add(Decimal::ONE))
            .and_then(|denom| dec!(100).checked_div(denom))
            .map(|x| dec!(100) - x)
            .unwrap_or(dec!(100))
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        self.state.name()
    }

    fn update(&mut self, time: DateTime<Utc>, value: Decimal) -> Decimal {
        if !self.state.accept(time) {
            return self.state.current();
        }

        if let Some(prev) = self.prev_value {
            // Saturates rather than overflowing for opposite-signed extremes.
            let change = value.saturating_sub(prev);
            let gain = if change > Decimal::ZERO { change } else { Decimal::ZERO };
            let loss = if change < Decimal::ZERO { change.abs() } else { Decimal::ZERO };
            self.avg_gain.update(time, gain);
            self.avg_loss.update(time, loss);
        }

        self.prev_value = Some(value);
        let rsi = self.compute();
        self.state.set_current(rsi)
    }

    fn current(&self) -> Decimal {
        self.state.current()
    }

    fn is_ready(&self) -> bool {
        self.avg_gain.is_ready() && self.avg_loss.is_ready()
    }

    fn warm_up_period(&self) -> usize {
        self.len + 1 // need one extra data point for the first change
    }

    fn samples(&self) -> usize {
        self.state.samples()
    }

    fn reset(&mut self) {
        self.prev_value = None;
        self.avg_gain.reset();
        self.avg_loss.reset();
        self.state.reset();
    }
}
