use serde::{Deserialize, Serialize};

use crate::finance::{ror_quarterly, sig_quarterly};

/// Belief about the daily rate of return of the risky asset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBelief {
    pub ror: f64,
    pub std: f64,
}

impl DailyBelief {
    pub fn new(ror: f64, std: f64) -> Self {
        Self { ror, std }
    }

    /// Scale to a quarter of `days_per_quarter` trading days
    pub fn to_quarterly(self, days_per_quarter: usize) -> RiskyExpectations {
        RiskyExpectations {
            risky_avg: 1.0 + ror_quarterly(self.ror, days_per_quarter),
            risky_std: sig_quarterly(self.std, days_per_quarter),
        }
    }
}

/// Quarterly belief handed to agents.
///
/// `risky_avg` is a gross return (1 + quarterly rate of return).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskyExpectations {
    pub risky_avg: f64,
    pub risky_std: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_to_quarterly() {
        let belief = DailyBelief::new(0.001, 0.01);
        let quarterly = belief.to_quarterly(60);
        assert_relative_eq!(quarterly.risky_avg, 1.001f64.powi(60), epsilon = 1e-12);
        assert_relative_eq!(quarterly.risky_std, 0.01 * 60f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_single_day_quarter_is_identity() {
        let quarterly = DailyBelief::new(0.02, 0.3).to_quarterly(1);
        assert_relative_eq!(quarterly.risky_avg, 1.02, epsilon = 1e-12);
        assert_relative_eq!(quarterly.risky_std, 0.3, epsilon = 1e-12);
    }
}
