//! Request/reply session wiring.
//!
//! A session is two queues. The simulation side publishes order flow on the
//! request queue and reads prices from the reply queue; the market side is
//! the mirror image.

use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::queue::{BoxPublisher, BoxSubscriber};

const DEFAULT_CAPACITY: usize = 1024;
const DEFAULT_REQUEST_QUEUE: &str = "market-requests";
const DEFAULT_REPLY_QUEUE: &str = "market-replies";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Undelivered messages a queue holds before publishing fails with `Full`
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self { capacity: DEFAULT_CAPACITY }
    }
}

/// Queue names and sizing for one market session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_request_queue")]
    pub request_queue: String,
    #[serde(default = "default_reply_queue")]
    pub reply_queue: String,
    #[serde(default)]
    pub channel: ChannelConfig,
}

fn default_request_queue() -> String {
    DEFAULT_REQUEST_QUEUE.to_owned()
}

fn default_reply_queue() -> String {
    DEFAULT_REPLY_QUEUE.to_owned()
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_queue: default_request_queue(),
            reply_queue: default_reply_queue(),
            channel: ChannelConfig::default(),
        }
    }
}

impl TransportConfig {
    /// In-process session with the default queue names.
    pub fn channel(capacity: usize) -> Self {
        Self {
            channel: ChannelConfig { capacity },
            ..Self::default()
        }
    }

    pub fn with_queues(self, request_queue: &str, reply_queue: &str) -> Self {
        Self {
            request_queue: request_queue.to_owned(),
            reply_queue: reply_queue.to_owned(),
            ..self
        }
    }
}

/// One participant's view of a session.
pub struct Endpoint {
    /// Where this side sends
    pub publisher: BoxPublisher,
    /// Where this side listens
    pub subscriber: BoxSubscriber,
}

pub struct TransportFactory;

impl TransportFactory {
    /// A single queue sized by `config`.
    #[cfg(feature = "channel")]
    pub fn create_pair(
        config: &TransportConfig,
    ) -> Result<(BoxPublisher, BoxSubscriber), TransportError> {
        match config.channel.capacity {
            0 => Err(TransportError::Config(
                "channel capacity must be positive".to_owned(),
            )),
            capacity => {
                let (publisher, subscriber) = crate::channel::channel_pair(capacity);
                Ok((Box::new(publisher), Box::new(subscriber)))
            }
        }
    }

    /// `(simulation, market)` endpoints of a new session.
    #[cfg(feature = "channel")]
    pub fn create_session(config: &TransportConfig) -> Result<(Endpoint, Endpoint), TransportError> {
        let (to_market, market_inbox) = Self::create_pair(config)?;
        let (to_simulation, simulation_inbox) = Self::create_pair(config)?;
        tracing::debug!(
            "Opened market session: requests on {}, replies on {}",
            config.request_queue,
            config.reply_queue
        );

        Ok((
            Endpoint {
                publisher: to_market,
                subscriber: simulation_inbox,
            },
            Endpoint {
                publisher: to_simulation,
                subscriber: market_inbox,
            },
        ))
    }
}
