use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Bookkeeping shared by every indicator: name, sample counter, current value
/// and the forward-only time guard.
#[derive(Debug, Clone)]
pub struct IndicatorState {
    name: String,
    samples: usize,
    current: Decimal,
    last_time: Option<DateTime<Utc>>,
    warned_out_of_order: bool,
}

impl IndicatorState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            samples: 0,
            current: Decimal::ZERO,
            last_time: None,
            warned_out_of_order: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn current(&self) -> Decimal {
        self.current
    }

    pub fn last_time(&self) -> Option<DateTime<Utc>> {
        self.last_time
    }

    /// Register an input stamped `time`.
    ///
    /// Returns `false` and leaves the state untouched when `time` is earlier than
    /// the last accepted input. Equal timestamps are accepted.
    pub fn accept(&mut self, time: DateTime<Utc>) -> bool {
        if let Some(last) = self.last_time {
            if time < last {
                if !self.warned_out_of_order {
                    tracing::warn!(
                        indicator = %self.name,
                        last = %last,
                        received = %time,
                        "Ignoring input older than the last accepted one"
                    );
                    self.warned_out_of_order = true;
                }
                return false;
            }
        }
        self.last_time = Some(time);
        self.samples += 1;
        true
    }

    /// Store a new current value and hand it back.
    pub fn set_current(&mut self, value: Decimal) -> Decimal {
        self.current = value;
        value
    }

    pub fn reset(&mut self) {
        self.samples = 0;
        self.current = Decimal::ZERO;
        self.last_time = None;
        self.warned_out_of_order = false;
    }
}
