//! Statistical utilities for simulation summaries.
//!
//! Every function returns `None` when the data cannot support the statistic
//! (too few points, zero variance) instead of producing NaN.

mod descriptive;
mod distribution;
mod tests_of_fit;

pub use descriptive::{
    argmax, argmin, correlation, kurtosis, mean, population_std, population_variance,
    sample_std, skew,
};
pub use distribution::{erf, kolmogorov_survival, normal_cdf};
pub use tests_of_fit::{KsTest, durbin_watson, ks_one_sample};
