use crate::ema::Ema;
use crate::sma::Sma;
use crate::{Indicator, IndicatorError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smoothing used for the average gain / loss inside RSI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovingAverageType {
    #[default]
    Simple,
    Exponential,
    Wilders,
}

impl MovingAverageType {
    pub const ALL: [MovingAverageType; 3] = [
        MovingAverageType::Simple,
        MovingAverageType::Exponential,
        MovingAverageType::Wilders,
    ];

    /// Build a moving average of this kind.
    pub fn create(self, period: usize) -> Result<MovingAverage, IndicatorError> {
        Ok(match self {
            MovingAverageType::Simple => MovingAverage::Simple(Sma::new(period)?),
            MovingAverageType::Exponential => MovingAverage::Exponential(Ema::new(period)?),
            MovingAverageType::Wilders => MovingAverage::Exponential(Ema::wilders(period)?),
        })
    }
}

impl fmt::Display for MovingAverageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MovingAverageType::Simple => "Simple",
            MovingAverageType::Exponential => "Exponential",
            MovingAverageType::Wilders => "Wilders",
        };
        f.write_str(s)
    }
}

impl FromStr for MovingAverageType {
    type Err = IndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" | "sma" => Ok(MovingAverageType::Simple),
            "exponential" | "ema" => Ok(MovingAverageType::Exponential),
            "wilders" | "wilder" | "rma" => Ok(MovingAverageType::Wilders),
            _ => Err(IndicatorError::UnknownMovingAverage(s.to_string())),
        }
    }
}

/// A moving average of any supported kind.
#[derive(Debug, Clone)]
pub enum MovingAverage {
    Simple(Sma),
    Exponential(Ema),
}

impl MovingAverage {
    fn inner(&self) -> &dyn Indicator {
        match self {
            MovingAverage::Simple(sma) => sma,
            MovingAverage::Exponential(ema) => ema,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Indicator {
        match self {
            MovingAverage::Simple(sma) => sma,
            MovingAverage::Exponential(ema) => ema,
        }
    }
}

impl Indicator for MovingAverage {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn update(&mut self, time: DateTime<Utc>, value: Decimal) -> Decimal {
        self.inner_mut().update(time, value)
    }

    fn current(&self) -> Decimal {
        self.inner().current()
    }

    fn is_ready(&self) -> bool {
        self.inner().is_ready()
    }

    fn warm_up_period(&self) -> usize {
        self.inner().warm_up_period()
    }

    fn samples(&self) -> usize {
        self.inner().samples()
    }

    fn reset(&mut self) {
        self.inner_mut().reset()
    }
}
