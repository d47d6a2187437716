mod agent;
mod expectations;
mod market_history;
mod market_parameters;
mod order;

pub use agent::{AgentId, AgentState};
pub use expectations::{DailyBelief, RiskyExpectations};
pub use market_history::{MarketHistory, PriceStats};
pub use market_parameters::MarketParameters;
pub use order::{BuySell, Order};
