use crate::state::IndicatorState;
use crate::{Indicator, IndicatorError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Exponential Moving Average (EMA).
///
/// Seeded with the simple mean of the first `period` values. Wilder's smoothing
/// is the same recurrence with a multiplier of `1 / period`.
#[derive(Debug, Clone)]
pub struct Ema {
    state: IndicatorState,
    len: usize,
    multiplier: Decimal,
    /// Accumulates values for the initial SMA seed; `None` once it overflows.
    seed_sum: Option<Decimal>,
}

impl Ema {
    /// Standard EMA with `k = 2 / (period + 1)`.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        Self::validate(period)?;
        let multiplier = Decimal::TWO / (Decimal::from(period) + Decimal::ONE);
        Ok(Self::build(format!("EMA({})", period), period, multiplier))
    }

    /// Wilder's smoothing, `k = 1 / period`.
    pub fn wilders(period: usize) -> Result<Self, IndicatorError> {
        Self::validate(period)?;
        let multiplier = Decimal::ONE / Decimal::from(period);
        Ok(Self::build(format!("WILDERS({})", period), period, multiplier))
    }

    fn validate(period: usize) -> Result<(), IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::InvalidConfiguration(
                "EMA period must be > 0".into(),
            ));
        }
        Ok(())
    }

    fn build(name: String, period: usize, multiplier: Decimal) -> Self {
        Self {
            state: IndicatorState::new(name),
            len: period,
            multiplier,
            seed_sum: Some(Decimal::ZERO),
        }
    }

    pub fn period(&self) -> usize {
        self.len
    }

    pub fn multiplier(&self) -> Decimal {
        self.multiplier
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        self.state.name()
    }

    fn update(&mut self, time: DateTime<Utc>, value: Decimal) -> Decimal {
        if !self.state.accept(time) {
            return self.state.current();
        }

        let count = self.state.samples();
        let prev = self.state.current();
        let next = if count <= self.len {
            let n = Decimal::from(count);
            self.seed_sum = self.seed_sum.and_then(|sum| sum.checked_add(value));
            match self.seed_sum {
                Some(sum) => sum / n,
                // The seed sum no longer fits; fold the value into the running mean.
                None => (prev - prev / n).saturating_add(value / n),
            }
        } else {
            let k = self.multiplier;
            value
                .checked_sub(prev)
                .and_then(|diff| diff.checked_mul(k))
                .and_then(|step| step.checked_add(prev))
                .unwrap_or_else(|| (prev - prev * k).saturating_add(value * k))
        };

        self.state.set_current(next)
    }

    fn current(&self) -> Decimal {
        self.state.current()
    }

    fn is_ready(&self) -> bool {
        self.state.samples() >= self.len
    }

    fn warm_up_period(&self) -> usize {
        self.len
    }

    fn samples(&self) -> usize {
        self.state.samples()
    }

    fn reset(&mut self) {
        self.seed_sum = Some(Decimal::ZERO);
        self.state.reset();
    }
}
