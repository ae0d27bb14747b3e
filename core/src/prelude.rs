use serde::{Deserialize, Serialize};
use std::fmt;

/// Default matching window, in milliseconds.
pub const DEFAULT_WINDOW_MS: u64 = 100;

/// How the matcher looks up sensor candidates for a truth sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Scan every sensor sample for every truth sample.
    #[default]
    Linear,
    /// Sort the sensor series once and binary-search the window bounds.
    Indexed,
}

/// Configuration consumed by the temporal matcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    pub tolerance_m: f64,
    #[serde(default)]
    pub strategy: SearchStrategy,
    #[serde(default)]
    pub parallel: bool,
}

fn default_window_ms() -> u64 {
    DEFAULT_WINDOW_MS
}

impl MatchConfig {
    pub fn new(tolerance_m: f64) -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
            tolerance_m,
            strategy: SearchStrategy::Linear,
            parallel: false,
        }
    }

    pub fn with_window_ms(mut self, window_ms: u64) -> Self {
        self.window_ms = window_ms;
        self
    }

    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.window_ms == 0 {
            return Err(MatchError::InvalidConfig(
                "window_ms must be greater than zero".into(),
            ));
        }
        if !self.tolerance_m.is_finite() || self.tolerance_m < 0.0 {
            return Err(MatchError::InvalidConfig(format!(
                "tolerance_m must be a finite non-negative number, got {}",
                self.tolerance_m
            )));
        }
        Ok(())
    }
}

/// Identifies which of the two input series a condition refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Series {
    Truth,
    Sensor,
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Series::Truth => write!(f, "truth"),
            Series::Sensor => write!(f, "sensor"),
        }
    }
}

/// Common error type for record normalisation and matching.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    #[error("invalid coordinate: {field} = {value}")]
    InvalidCoordinate { field: &'static str, value: String },
    #[error("malformed timestamp {value:?}: {reason}")]
    MalformedTimestamp { value: String, reason: String },
    #[error("{series} series is empty")]
    EmptyInput { series: Series },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MatchError {
    pub(crate) fn coordinate(field: &'static str, value: impl fmt::Display) -> Self {
        MatchError::InvalidCoordinate {
            field,
            value: value.to_string(),
        }
    }

    pub(crate) fn timestamp(value: impl Into<String>, reason: impl Into<String>) -> Self {
        MatchError::MalformedTimestamp {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

pub type CoreResult<T> = Result<T, MatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_hundred_ms_window() {
        let config = MatchConfig::new(20.0);
        assert_eq!(config.window_ms, 100);
        assert_eq!(config.strategy, SearchStrategy::Linear);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_window_and_bad_tolerance() {
        assert!(MatchConfig::new(5.0).with_window_ms(0).validate().is_err());
        assert!(MatchConfig::new(-1.0).validate().is_err());
        assert!(MatchConfig::new(f64::NAN).validate().is_err());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: MatchConfig = serde_json::from_str(r#"{"tolerance_m": 12.5}"#).unwrap();
        assert_eq!(config.window_ms, DEFAULT_WINDOW_MS);
        assert!(!config.parallel);
        assert_eq!(config.tolerance_m, 12.5);
    }
}
