use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Market Data
// ---------------------------------------------------------------------------

/// A single OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub instrument: String,
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Bar {
    pub fn new(
        instrument: &str,
        timestamp: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            instrument: instrument.to_string(),
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// High minus low, saturating at the `Decimal` bounds.
    pub fn range(&self) -> Decimal {
        self.high.saturating_sub(self.low)
    }

    /// True when the bar carries no traded volume.
    pub fn is_zero_volume(&self) -> bool {
        self.volume.is_zero()
    }
}
