//! Run configuration
//!
//! A run is described by one JSON document:
//!
//! ```json
//! {
//!   "simulation": { "quarters": 2, "runs_per_quarter": 60, "burn_in_days": 10 },
//!   "market": { "kind": "stochastic", "seed": 7 },
//!   "expectations": { "policy": "chartist", "p1": 0.1 },
//!   "population": { "classes": [{ "label": "cautious", "crra": 6.0, "count": 20 }] }
//! }
//! ```

use serde::{Deserialize, Serialize};
use sharkfin_expectations::ExpectationsConfig;
use sharkfin_market::{RemoteMarketConfig, StochasticMarketConfig};
use std::path::Path;
use thiserror::Error;

use crate::population::MertonPopulationConfig;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {error}")]
    Io { path: String, error: String },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Shape of the quarter loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_quarters")]
    pub quarters: usize,

    /// Market runs per quarter; each run is followed by
    /// `days_per_quarter / runs_per_quarter` days
    #[serde(default = "default_days_per_quarter")]
    pub runs_per_quarter: usize,

    #[serde(default = "default_days_per_quarter")]
    pub days_per_quarter: usize,

    /// Daily probability that an agent re-reads the market; defaults to
    /// `1 / runs_per_quarter`
    #[serde(default)]
    pub attention_rate: Option<f64>,

    /// Zero-order days before tracking starts
    #[serde(default)]
    pub burn_in_days: usize,

    /// Seed for attention draws and macro-day assignment
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_quarters() -> usize {
    1
}

fn default_days_per_quarter() -> usize {
    60
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            quarters: default_quarters(),
            runs_per_quarter: default_days_per_quarter(),
            days_per_quarter: default_days_per_quarter(),
            attention_rate: None,
            burn_in_days: 0,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn days_per_run(&self) -> usize {
        self.days_per_quarter / self.runs_per_quarter.max(1)
    }

    pub fn attention_rate(&self) -> f64 {
        self.attention_rate
            .unwrap_or(1.0 / self.runs_per_quarter.max(1) as f64)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days_per_quarter == 0 || self.runs_per_quarter == 0 {
            return Err(ConfigError::Invalid(
                "days_per_quarter and runs_per_quarter must be positive".to_string(),
            ));
        }
        if self.days_per_quarter % self.runs_per_quarter != 0 {
            return Err(ConfigError::Invalid(format!(
                "runs_per_quarter {} does not divide days_per_quarter {}",
                self.runs_per_quarter, self.days_per_quarter
            )));
        }
        let rate = self.attention_rate();
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::Invalid(format!(
                "attention_rate {rate} outside [0, 1]"
            )));
        }
        Ok(())
    }
}

/// Market backend, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarketConfig {
    Stochastic(StochasticMarketConfig),
    Remote(RemoteMarketConfig),
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self::Stochastic(StochasticMarketConfig::default())
    }
}

/// Single preset trade after a burn-in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    #[serde(default)]
    pub buy: u64,
    #[serde(default)]
    pub sell: u64,
    #[serde(default)]
    pub burn_in_days: usize,
}

/// Root configuration of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub market: MarketConfig,

    #[serde(default)]
    pub expectations: ExpectationsConfig,

    #[serde(default)]
    pub population: MertonPopulationConfig,

    /// Run a calibration shock instead of the attention loop
    #[serde(default)]
    pub calibration: Option<CalibrationConfig>,
}

impl RunConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;
        self.expectations
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.population.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config = RunConfig::from_json("{}").unwrap();
        assert_eq!(config.simulation, SimulationConfig::default());
        assert_eq!(config.expectations, ExpectationsConfig::Usual);
        assert!(matches!(config.market, MarketConfig::Stochastic(_)));
        assert!(config.calibration.is_none());
    }

    #[test]
    fn test_default_attention_rate() {
        let config = SimulationConfig {
            runs_per_quarter: 20,
            ..Default::default()
        };
        assert_eq!(config.attention_rate(), 0.05);
        assert_eq!(config.days_per_run(), 3);
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "simulation": { "quarters": 2, "runs_per_quarter": 30, "burn_in_days": 5, "seed": 3 },
            "market": { "kind": "remote", "timeout_ms": 500, "max_retries": 2 },
            "expectations": { "policy": "inferential", "zeta": 0.2 },
            "calibration": { "buy": 100 }
        }"#;
        let config = RunConfig::from_json(json).unwrap();

        assert_eq!(config.simulation.quarters, 2);
        assert_eq!(config.simulation.days_per_run(), 2);
        match &config.market {
            MarketConfig::Remote(remote) => {
                assert_eq!(remote.timeout_ms, 500);
                assert_eq!(remote.max_retries, 2);
            }
            other => panic!("expected remote market, got {other:?}"),
        }
        assert_eq!(config.expectations.name(), "inferential");
        assert_eq!(
            config.calibration,
            Some(CalibrationConfig {
                buy: 100,
                sell: 0,
                burn_in_days: 0
            })
        );
    }

    #[test]
    fn test_rejects_uneven_runs() {
        let json = r#"{ "simulation": { "runs_per_quarter": 7 } }"#;
        assert!(matches!(
            RunConfig::from_json(json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_attention_rate() {
        let config = SimulationConfig {
            attention_rate: Some(1.5),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = RunConfig::from_file("/nonexistent/sharkfin.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            RunConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
