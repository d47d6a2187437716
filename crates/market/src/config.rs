//! Market configuration

use serde::{Deserialize, Serialize};
use sharkfin_core::{DEFAULT_PRICE, MarketParameters};
use sharkfin_ports::RunArgs;
use sharkfin_transport::TransportConfig;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketConfigError {
    #[error("invalid market parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

pub(crate) fn check_positive(name: &'static str, value: f64) -> Result<(), MarketConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MarketConfigError::InvalidParameter { name, value })
    }
}

pub(crate) fn check_non_negative(name: &'static str, value: f64) -> Result<(), MarketConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MarketConfigError::InvalidParameter { name, value })
    }
}

fn default_price() -> f64 {
    DEFAULT_PRICE
}

/// Configuration for the in-process stochastic market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StochasticMarketConfig {
    #[serde(default)]
    pub parameters: MarketParameters,

    /// Seed price
    #[serde(default = "default_price")]
    pub initial_price: f64,

    /// Log-price shift per unit of log buy/sell imbalance
    #[serde(default = "default_price_impact")]
    pub price_impact: f64,

    /// Log-price noise per unit of log total volume
    #[serde(default = "default_volume_volatility")]
    pub volume_volatility: f64,

    /// Random seed; drawn from entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_price_impact() -> f64 {
    0.01
}

fn default_volume_volatility() -> f64 {
    0.002
}

impl Default for StochasticMarketConfig {
    fn default() -> Self {
        Self {
            parameters: MarketParameters::default(),
            initial_price: default_price(),
            price_impact: default_price_impact(),
            volume_volatility: default_volume_volatility(),
            seed: None,
        }
    }
}

impl StochasticMarketConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), MarketConfigError> {
        validate_parameters(&self.parameters)?;
        check_positive("initial_price", self.initial_price)?;
        check_non_negative("price_impact", self.price_impact)?;
        check_non_negative("volume_volatility", self.volume_volatility)
    }
}

/// Configuration for a market reached over a request/response session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteMarketConfig {
    #[serde(default)]
    pub transport: TransportConfig,

    /// Source name stamped on outgoing envelopes
    #[serde(default = "default_source")]
    pub source: String,

    #[serde(default)]
    pub parameters: MarketParameters,

    #[serde(default = "default_price")]
    pub initial_price: f64,

    /// First sleep between empty polls
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Backoff ceiling between empty polls
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Wait per attempt before the request counts as timed out
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Republish attempts after a timeout
    #[serde(default)]
    pub max_retries: u32,

    /// Extra arguments merged into every request
    #[serde(default)]
    pub run_args: RunArgs,

    /// Seed of the local dividend process
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_source() -> String {
    "sharkfin".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1
}

fn default_max_backoff_ms() -> u64 {
    50
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for RemoteMarketConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            source: default_source(),
            parameters: MarketParameters::default(),
            initial_price: default_price(),
            poll_interval_ms: default_poll_interval_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            timeout_ms: default_timeout_ms(),
            max_retries: 0,
            run_args: RunArgs::new(),
            seed: None,
        }
    }
}

impl RemoteMarketConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms.max(self.poll_interval_ms).max(1))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> Result<(), MarketConfigError> {
        validate_parameters(&self.parameters)?;
        check_positive("initial_price", self.initial_price)
    }
}

fn validate_parameters(parameters: &MarketParameters) -> Result<(), MarketConfigError> {
    check_positive("dividend_growth_rate", parameters.dividend_growth_rate)?;
    check_non_negative("dividend_std", parameters.dividend_std)?;
    check_positive("price_to_dividend_ratio", parameters.price_to_dividend_ratio)
}
