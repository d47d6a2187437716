//! Message transport between a simulation and an out-of-process market.
//!
//! The simulation publishes one [`WireMessage`] of order flow per day and
//! waits for the reply carrying the same correlation id. [`Publisher`] and
//! [`Subscriber`] hide the queue implementation; the `channel` feature
//! (on by default) provides in-process crossbeam queues.
//!
//! ```rust,ignore
//! use sharkfin_transport::{TransportConfig, TransportFactory};
//!
//! let (simulation, market) = TransportFactory::create_session(&TransportConfig::default())?;
//! simulation.publisher.publish(&request.encode()?)?;
//! market.subscriber.poll(&mut |bytes| handle(bytes))?;
//! ```

#[cfg(feature = "channel")]
pub mod channel;
pub mod envelope;
pub mod error;
pub mod queue;
pub mod session;

pub use envelope::{MessageType, WireMessage};
pub use error::TransportError;
pub use queue::{BoxPublisher, BoxSubscriber, Publisher, Subscriber};
pub use session::{ChannelConfig, Endpoint, TransportConfig, TransportFactory};

#[cfg(feature = "channel")]
pub use channel::{ChannelPublisher, ChannelSubscriber, channel_pair};
