//! Policy selection

use serde::{Deserialize, Serialize};
use sharkfin_ports::Expectations;
use thiserror::Error;

use crate::chartist::{ChartistExpectations, ChartistParams};
use crate::inferential::InferentialExpectations;
use crate::usual::UsualExpectations;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpectationsConfigError {
    #[error("invalid expectations parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("days per quarter must be positive")]
    EmptyQuarter,
}

/// Belief-update policy, tagged by `policy`:
///
/// ```json
/// { "policy": "inferential", "p1": 0.1, "delta_t1": 30, "zeta": 0.5 }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ExpectationsConfig {
    #[default]
    Usual,
    Chartist(ChartistParams),
    Inferential {
        #[serde(flatten)]
        params: ChartistParams,
        #[serde(default = "default_zeta")]
        zeta: f64,
    },
}

fn default_zeta() -> f64 {
    0.5
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ExpectationsConfigError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ExpectationsConfigError::InvalidParameter { name, value })
    }
}

fn check_horizon(name: &'static str, value: f64) -> Result<(), ExpectationsConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ExpectationsConfigError::InvalidParameter { name, value })
    }
}

fn validate_params(params: &ChartistParams) -> Result<(), ExpectationsConfigError> {
    check_probability("p1", params.p1)?;
    check_probability("p2", params.p2)?;
    check_horizon("delta_t1", params.delta_t1)?;
    check_horizon("delta_t2", params.delta_t2)
}

impl ExpectationsConfig {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Usual => "usual",
            Self::Chartist(_) => "chartist",
            Self::Inferential { .. } => "inferential",
        }
    }

    pub fn validate(&self) -> Result<(), ExpectationsConfigError> {
        match self {
            Self::Usual => Ok(()),
            Self::Chartist(params) => validate_params(params),
            Self::Inferential { params, zeta } => {
                validate_params(params)?;
                if (0.0..=1.0).contains(zeta) {
                    Ok(())
                } else {
                    Err(ExpectationsConfigError::InvalidParameter {
                        name: "zeta",
                        value: *zeta,
                    })
                }
            }
        }
    }

    /// Validate and construct the selected policy
    pub fn build(
        &self,
        days_per_quarter: usize,
    ) -> Result<Box<dyn Expectations>, ExpectationsConfigError> {
        if days_per_quarter == 0 {
            return Err(ExpectationsConfigError::EmptyQuarter);
        }
        self.validate()?;
        tracing::debug!("Building {} expectations", self.name());

        Ok(match self {
            Self::Usual => Box::new(UsualExpectations::new(days_per_quarter)),
            Self::Chartist(params) => Box::new(ChartistExpectations::new(*params, days_per_quarter)),
            Self::Inferential { params, zeta } => Box::new(InferentialExpectations::new(
                *params,
                *zeta,
                days_per_quarter,
            )),
        })
    }
}
