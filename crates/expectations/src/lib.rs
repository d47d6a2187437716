//! SHARKFin Expectations
//!
//! Three belief-update policies implementing the
//! [`Expectations`](sharkfin_ports::Expectations) port:
//!
//! - **Usual**: constant belief from the market's structural parameters
//! - **Chartist**: exponentially weighted memory of realized returns
//! - **Inferential**: per-agent choice between the two, gated by a
//!   Kolmogorov-Smirnov test of the returns the agent has observed
//!
//! The policy is picked once at construction via [`ExpectationsConfig`].

mod chartist;
mod config;
mod inferential;
mod usual;

#[cfg(test)]
pub(crate) mod testing;

pub use chartist::{ChartistExpectations, ChartistParams, memory_weighted_belief};
pub use config::{ExpectationsConfig, ExpectationsConfigError};
pub use inferential::InferentialExpectations;
pub use usual::UsualExpectations;
