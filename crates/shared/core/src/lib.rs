//! SHARKFin Core Domain
//!
//! Pure domain types for the SHARKFin repeated-market simulation.
//! This crate contains no I/O and is 100% unit testable.

pub mod entities;
pub mod finance;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    AgentId, AgentState, BuySell, DailyBelief, MarketHistory, MarketParameters, Order, PriceStats,
    RiskyExpectations,
};
pub use values::{DEFAULT_PRICE, Day, Timestamp};
