//! Finance helpers shared by markets and expectations.

use crate::entities::DailyBelief;

/// Compound a daily rate of return over `days` days
pub fn ror_quarterly(ror: f64, days: usize) -> f64 {
    (1.0 + ror).powf(days as f64) - 1.0
}

/// Scale a daily standard deviation to `days` days
pub fn sig_quarterly(std: f64, days: usize) -> f64 {
    std * (days as f64).sqrt()
}

/// Parameters `(mu, sigma)` of the underlying normal of a log-normal
/// variable with mean `mean` and standard deviation `std`
pub fn lognormal_moments_to_normal(mean: f64, std: f64) -> (f64, f64) {
    let mean_sq = mean * mean;
    let mu = (mean_sq / (mean_sq + std * std).sqrt()).ln();
    let sigma = (1.0 + std * std / mean_sq).ln().sqrt();
    (mu, sigma)
}

/// Daily return implied by a Lucas asset-pricing model with a fixed
/// price-to-dividend ratio and a log-normal dividend growth process
pub fn lucas_expected_rate_of_return(
    price_to_dividend_ratio: f64,
    dividend_growth_rate: f64,
    dividend_std: f64,
) -> DailyBelief {
    let adjuster = (1.0 + price_to_dividend_ratio) / price_to_dividend_ratio;
    DailyBelief {
        ror: adjuster * dividend_growth_rate - 1.0,
        std: dividend_std * adjuster * dividend_growth_rate,
    }
}
