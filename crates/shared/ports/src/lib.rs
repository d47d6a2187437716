//! SHARKFin Ports
//!
//! Port definitions (traits) for the SHARKFin market simulation.
//! These define the boundaries between the simulation core and its
//! collaborators: markets, belief-update policies and agent populations.

mod agent;
mod error;
mod expectations;
mod market;

pub use agent::{Agent, AgentRecord, ClassStats, Population};
pub use error::{MarketError, MarketResult, PopulationError, PopulationResult};
pub use expectations::Expectations;
pub use market::{Market, RunArgs};
