//! SHARKFin Runner - Attention-Driven Market Simulation
//!
//! Orchestrates repeated runs of a market against a population of agents:
//!
//! - **Simulation**: the attention loop over quarters, macro-steps and days
//! - **Calibration**: a quiet burn-in followed by one preset trade
//! - **History / Stats**: per-day table and end-of-run summary with status
//! - **Population**: a reference population of closed-form portfolio agents
//! - **Bootstrap**: wiring a run from a JSON [`RunConfig`]
//!
//! ## Day loop
//!
//! ```text
//!  attention draw ──► Broker.transact ──► Broker.trade ──► Market
//!                                                            │
//!      ┌─────────────────────────────────────────────────────┘
//!      ▼   (days_per_run times; later days padded by dummy_run)
//!  macro updates ──► wealth settlement ──► track ──► Expectations update
//! ```

pub mod bootstrap;
pub mod calibration;
pub mod config;
pub mod error;
pub mod history;
pub mod population;
pub mod simulation;
pub mod stats;

pub use bootstrap::{RunReport, run};
pub use calibration::{CalibrationRecord, CalibrationSimulation, ShockResponse};
pub use config::{CalibrationConfig, ConfigError, MarketConfig, RunConfig, SimulationConfig};
pub use error::{Result, SimulationError};
pub use history::{DayRecord, History, PopulationSnapshot};
pub use population::{MertonAgent, MertonClassConfig, MertonPopulation, MertonPopulationConfig};
pub use simulation::{AttentionSimulation, SimulationState};
pub use stats::{RunStatus, SimStats, VolumeStats};
