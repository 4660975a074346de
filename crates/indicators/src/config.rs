use crate::moving_average::MovingAverageType;
use crate::stoch_rsi::StochRsi;
use crate::IndicatorError;
use serde::{Deserialize, Serialize};

/// Configuration for a StochRSI instance, loadable from TOML.
///
/// ```toml
/// period = 14
/// ma_type = "wilders"
/// name = "STORSI daily"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StochRsiConfig {
    pub period: usize,
    pub ma_type: MovingAverageType,
    /// Display name. Defaults to `STORSI(period, ma_type)`.
    pub name: Option<String>,
}

impl Default for StochRsiConfig {
    fn default() -> Self {
        Self {
            period: 14,
            ma_type: MovingAverageType::Simple,
            name: None,
        }
    }
}

impl StochRsiConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, IndicatorError> {
        toml::from_str(s).map_err(|e| IndicatorError::InvalidConfiguration(e.to_string()))
    }

    pub fn build(&self) -> Result<StochRsi, IndicatorError> {
        match &self.name {
            Some(name) => StochRsi::with_name(name.clone(), self.period, self.ma_type),
            None => StochRsi::new(self.period, self.ma_type),
        }
    }
}
