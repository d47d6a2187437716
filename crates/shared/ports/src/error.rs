use std::time::Duration;
use thiserror::Error;

/// Errors that end a simulation run.
///
/// Every variant is fatal to continuation: the orchestrator stops issuing
/// days and classifies [`MarketError::reason`] into a status code.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    #[error("market stopped: {0}")]
    Stopped(String),

    #[error("no market response within {0:?}")]
    Timeout(Duration),

    #[error("malformed market response: {0}")]
    MalformedResponse(String),

    #[error("market transport failure: {0}")]
    Transport(String),

    #[error("market request already in flight: {0}")]
    RequestInFlight(String),

    #[error("market is closed")]
    Closed,
}

impl MarketError {
    /// Failure message used for status classification
    pub fn reason(&self) -> String {
        match self {
            MarketError::Stopped(reason) => reason.clone(),
            other => other.to_string(),
        }
    }
}

pub type MarketResult<T> = std::result::Result<T, MarketError>;

/// Contract violations by a population collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PopulationError {
    #[error("population does not support {0}")]
    Unsupported(&'static str),

    #[error("invalid population state: {0}")]
    Invalid(String),
}

pub type PopulationResult<T> = std::result::Result<T, PopulationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_reason_is_raw_message() {
        let err = MarketError::Stopped("Stopped: Hit market maker price range".into());
        assert_eq!(err.reason(), "Stopped: Hit market maker price range");
    }

    #[test]
    fn test_timeout_reason_mentions_duration() {
        let err = MarketError::Timeout(Duration::from_secs(2));
        assert!(err.reason().contains("no market response"));
    }
}
