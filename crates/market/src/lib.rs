//! SHARKFin Markets
//!
//! Two implementations of the [`Market`](sharkfin_ports::Market) port:
//!
//! - **StochasticMarket**: in-process, seeded, price impact from log volume
//! - **RemoteMarket**: clearing delegated to another process over a
//!   message-passing request/response session
//!
//! plus the **MarketServer** that answers the remote protocol, used for
//! in-process sessions and tests.

pub mod config;
pub mod dividend;
pub mod protocol;
pub mod remote;
pub mod server;
pub mod stochastic;

pub use config::{MarketConfigError, RemoteMarketConfig, StochasticMarketConfig};
pub use dividend::DividendProcess;
pub use protocol::{MarketReply, MarketRequest, parse_reply};
pub use remote::RemoteMarket;
pub use server::{MarketServer, ServerReply, fundamental_quote};
pub use stochastic::StochasticMarket;
