use crate::state::IndicatorState;
use crate::{Indicator, IndicatorError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::VecDeque;

/// Simple Moving Average (SMA).
///
/// While warming up the value is the mean of the inputs seen so far.
#[derive(Debug, Clone)]
pub struct Sma {
    state: IndicatorState,
    len: usize,
    buffer: VecDeque<Decimal>,
    /// Running sum of `buffer`, `None` while it does not fit in a `Decimal`.
    sum: Option<Decimal>,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::InvalidConfiguration(
                "SMA period must be > 0".into(),
            ));
        }
        Ok(Self {
            state: IndicatorState::new(format!("SMA({})", period)),
            len: period,
            buffer: VecDeque::with_capacity(period),
            sum: Some(Decimal::ZERO),
        })
    }

    pub fn period(&self) -> usize {
        self.len
    }

    /// Mean as the sum of `value / n`, which stays in range when the plain sum does not.
    fn mean_by_parts(&self) -> Decimal {
        let n = Decimal::from(self.buffer.len());
        self.buffer
            .iter()
            .fold(Decimal::ZERO, |acc, v| acc.saturating_add(*v / n))
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        self.state.name()
    }

    fn update(&mut self, time: DateTime<Utc>, value: Decimal) -> Decimal {
        if !self.state.accept(time) {
            return self.state.current();
        }

        self.buffer.push_back(value);
        let removed = if self.buffer.len() > self.len {
            self.buffer.pop_front()
        } else {
            None
        };

        self.sum = self
            .sum
            .and_then(|sum| sum.checked_add(value))
            .and_then(|sum| match removed {
                Some(r) => sum.checked_sub(r),
                None => Some(sum),
            })
            .or_else(|| {
                self.buffer
                    .iter()
                    .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
            });

        let mean = match self.sum {
            Some(sum) => sum / Decimal::from(self.buffer.len()),
            None => {
                tracing::trace!(indicator = %self.state.name(), "Window sum overflows, averaging by parts");
                self.mean_by_parts()
            }
        };
        self.state.set_current(mean)
    }

    fn current(&self) -> Decimal {
        self.state.current()
    }

    fn is_ready(&self) -> bool {
        self.buffer.len() == self.len
    }

    fn warm_up_period(&self) -> usize {
        self.len
    }

    fn samples(&self) -> usize {
        self.state.samples()
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.sum = Some(Decimal::ZERO);
        self.state.reset();
    }
}
