use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an agent
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Mutable per-period agent state, in normalized money units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    /// Asset level
    pub a_lvl: f64,
    /// Normalized market resources
    pub m_nrm: f64,
    /// Permanent income level
    pub p_lvl: f64,
}

impl Default for AgentState {
    fn default() -> Self {
        Self {
            a_lvl: 0.0,
            m_nrm: 0.0,
            p_lvl: 1.0,
        }
    }
}
