use thiserror::Error;

/// Failures raised while moving bytes between a simulation and its market.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The other side of the queue went away
    #[error("channel closed")]
    ChannelClosed,

    /// The queue is at capacity
    #[error("buffer full")]
    Full,

    #[error("serialization error: {0}")]
    Serialization(String),

    /// Envelope carried a discriminator this build does not know
    #[error("unknown message type: {0}")]
    UnknownMessageType(u8),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<bincode::Error> for TransportError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
