//! SHARKFin Broker
//!
//! Converts many per-agent order deltas into one net daily market order and
//! keeps an audit trail separating attention-driven from macro trading.

mod broker;

pub use broker::{Broker, TradeOutcome};
