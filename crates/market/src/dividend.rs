//! Dividend process shared by both market variants.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use sharkfin_core::MarketParameters;

use crate::config::{MarketConfigError, check_non_negative, check_positive};

/// Geometric dividend process,
/// `d[t] = d[t-1] * g * exp(N(0, std) - std^2 / 2)`
#[derive(Debug, Clone)]
pub struct DividendProcess {
    growth_rate: f64,
    drift_correction: f64,
    shock: Normal<f64>,
}

impl DividendProcess {
    pub fn new(parameters: &MarketParameters) -> Result<Self, MarketConfigError> {
        check_positive("dividend_growth_rate", parameters.dividend_growth_rate)?;
        check_non_negative("dividend_std", parameters.dividend_std)?;
        let std = parameters.dividend_std;
        let shock = Normal::new(0.0, std).map_err(|_| MarketConfigError::InvalidParameter {
            name: "dividend_std",
            value: std,
        })?;

        Ok(Self {
            growth_rate: parameters.dividend_growth_rate,
            drift_correction: std * std / 2.0,
            shock,
        })
    }

    /// Draw the dividend following `last`
    pub fn next<R: Rng + ?Sized>(&self, last: f64, rng: &mut R) -> f64 {
        let shock = self.shock.sample(rng);
        last * self.growth_rate * (shock - self.drift_correction).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_zero_std_is_pure_growth() {
        let params = MarketParameters {
            dividend_std: 0.0,
            ..Default::default()
        };
        let process = DividendProcess::new(&params).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_relative_eq!(process.next(2.0, &mut rng), 2.0 * 1.000628, epsilon = 1e-12);
    }

    #[test]
    fn test_mean_growth_is_driftless() {
        let params = MarketParameters {
            dividend_std: 0.05,
            ..Default::default()
        };
        let process = DividendProcess::new(&params).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let n = 50_000;
        let mean: f64 = (0..n).map(|_| process.next(1.0, &mut rng)).sum::<f64>() / n as f64;
        assert_relative_eq!(mean, 1.000628, epsilon = 2e-3);
    }

    #[test]
    fn test_same_seed_same_path() {
        let process = DividendProcess::new(&MarketParameters::default()).unwrap();
        let mut a = StdRng::seed_from_u64(9);
        let mut b = StdRng::seed_from_u64(9);
        for _ in 0..10 {
            assert_eq!(process.next(1.0, &mut a), process.next(1.0, &mut b));
        }
    }

    #[test]
    fn test_rejects_zero_growth() {
        let params = MarketParameters {
            dividend_growth_rate: 0.0,
            ..Default::default()
        };
        assert!(DividendProcess::new(&params).is_err());
    }
}
