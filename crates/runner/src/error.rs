use sharkfin_expectations::ExpectationsConfigError;
use sharkfin_market::MarketConfigError;
use sharkfin_ports::{MarketError, PopulationError};
use sharkfin_transport::TransportError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::simulation::SimulationState;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("market configuration: {0}")]
    MarketConfig(#[from] MarketConfigError),

    #[error("expectations configuration: {0}")]
    Expectations(#[from] ExpectationsConfigError),

    #[error("market: {0}")]
    Market(#[from] MarketError),

    #[error("population: {0}")]
    Population(#[from] PopulationError),

    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    #[error("cannot {operation} in state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: SimulationState,
    },
}

pub type Result<T> = std::result::Result<T, SimulationError>;
