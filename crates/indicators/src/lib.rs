pub mod config;
pub mod ema;
pub mod maximum;
pub mod minimum;
pub mod moving_average;
pub mod rsi;
pub mod sma;
pub mod state;
pub mod stoch_rsi;
mod window;

pub use config::StochRsiConfig;
pub use maximum::Maximum;
pub use minimum::Minimum;
pub use moving_average::{MovingAverage, MovingAverageType};
pub use rsi::Rsi;
pub use state::IndicatorState;
pub use stoch_rsi::StochRsi;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use stochrsi_core::Bar;

/// Errors raised while configuring an indicator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndicatorError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Unknown moving average type: {0}")]
    UnknownMovingAverage(String),
}

/// Trait for streaming (incremental) indicators over a scalar series.
/// Feed one value at a time; the indicator maintains internal state.
pub trait Indicator: Send + Sync {
    /// Display name, e.g. `SMA(14)`.
    fn name(&self) -> &str;

    /// Process the next value and return the indicator's current value.
    fn update(&mut self, time: DateTime<Utc>, value: Decimal) -> Decimal;

    /// The most recent output, zero until the first value is produced.
    fn current(&self) -> Decimal;

    /// Whether the indicator has seen enough data for its output to be valid.
    fn is_ready(&self) -> bool;

    /// Number of inputs required before `is_ready` turns true.
    fn warm_up_period(&self) -> usize;

    /// Number of inputs accepted since construction or the last reset.
    fn samples(&self) -> usize;

    /// Reset the indicator to its initial state.
    fn reset(&mut self);
}

/// Trait for streaming indicators that consume whole OHLCV bars.
pub trait BarIndicator: Send + Sync {
    fn name(&self) -> &str;

    /// Process the next bar and return the indicator's current value.
    fn update(&mut self, bar: &Bar) -> Decimal;

    fn current(&self) -> Decimal;

    fn is_ready(&self) -> bool;

    fn warm_up_period(&self) -> usize;

    fn samples(&self) -> usize;

    fn reset(&mut self);
}
