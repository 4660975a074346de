use crate::state::IndicatorState;
use crate::window::{Extreme, MonotonicWindow};
use crate::{Indicator, IndicatorError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Rolling maximum over the last `period` values.
#[derive(Debug, Clone)]
pub struct Maximum {
    state: IndicatorState,
    len: usize,
    window: MonotonicWindow,
}

impl Maximum {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::InvalidConfiguration(
                "Maximum period must be > 0".into(),
            ));
        }
        Ok(Self {
            state: IndicatorState::new(format!("MAX({})", period)),
            len: period,
            window: MonotonicWindow::new(period, Extreme::Max),
        })
    }

    pub fn period(&self) -> usize {
        self.len
    }

    /// Number of updates since the current maximum was observed.
    pub fn periods_since_maximum(&self) -> usize {
        self.window.periods_since()
    }
}

impl Indicator for Maximum {
    fn name(&self) -> &str {
        self.state.name()
    }

    fn update(&mut self, time: DateTime<Utc>, value: Decimal) -> Decimal {
        if !self.state.accept(time) {
            return self.state.current();
        }
        let max = self.window.push(value);
        self.state.set_current(max)
    }

    fn current(&self) -> Decimal {
        self.state.current()
    }

    fn is_ready(&self) -> bool {
        self.window.is_full()
    }

    fn warm_up_period(&self) -> usize {
        self.len
    }

    fn samples(&self) -> usize {
        self.state.samples()
    }

    fn reset(&mut self) {
        self.window.clear();
        self.state.reset();
    }
}
