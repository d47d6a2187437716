use serde::{Deserialize, Serialize};

use crate::entities::DailyBelief;
use crate::finance::lucas_expected_rate_of_return;

/// Structural parameters of the dividend process a market runs on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketParameters {
    /// Daily gross dividend growth rate
    pub dividend_growth_rate: f64,
    /// Daily standard deviation of dividend growth
    pub dividend_std: f64,
    /// Price-to-dividend ratio of the fundamental price
    pub price_to_dividend_ratio: f64,
}

impl Default for MarketParameters {
    fn default() -> Self {
        Self {
            dividend_growth_rate: 1.000628,
            dividend_std: 0.011988,
            price_to_dividend_ratio: 60.0 / 0.05,
        }
    }
}

impl MarketParameters {
    /// Daily return implied by the structural parameters alone
    pub fn structural_belief(&self) -> DailyBelief {
        lucas_expected_rate_of_return(
            self.price_to_dividend_ratio,
            self.dividend_growth_rate,
            self.dividend_std,
        )
    }

    /// Dividend consistent with `price` at the fundamental ratio
    pub fn dividend_for(&self, price: f64) -> f64 {
        price / self.price_to_dividend_ratio
    }
}
