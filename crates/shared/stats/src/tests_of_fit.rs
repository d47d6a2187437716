use crate::descriptive::mean;
use crate::distribution::kolmogorov_survival;

/// Result of a one-sample Kolmogorov-Smirnov test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KsTest {
    /// Supremum distance between empirical and reference CDF
    pub statistic: f64,
    /// Asymptotic p-value with Stephens' small-sample correction
    pub p_value: f64,
}

/// One-sample Kolmogorov-Smirnov test of `data` against the CDF `cdf`.
///
/// Returns `None` for empty or non-finite data.
pub fn ks_one_sample(data: &[f64], cdf: impl Fn(f64) -> f64) -> Option<KsTest> {
    if data.is_empty() || data.iter().any(|x| !x.is_finite()) {
        return None;
    }

    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len() as f64;

    let statistic = sorted
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let f = cdf(x);
            let above = (i + 1) as f64 / n - f;
            let below = f - i as f64 / n;
            above.max(below)
        })
        .fold(0.0, f64::max);

    let sqrt_n = n.sqrt();
    let p_value = kolmogorov_survival((sqrt_n + 0.12 + 0.11 / sqrt_n) * statistic);

    Some(KsTest { statistic, p_value })
}

/// Durbin-Watson statistic of `values` after removing a linear trend.
///
/// Residuals come from an OLS fit on the index. Values near 2 indicate no
/// first-order autocorrelation.
pub fn durbin_watson(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }

    let index: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let mean_x = mean(&index)?;
    let mean_y = mean(values)?;
    let sxx: f64 = index.iter().map(|x| (x - mean_x).powi(2)).sum();
    let sxy: f64 = index
        .iter()
        .zip(values)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let residuals: Vec<f64> = index
        .iter()
        .zip(values)
        .map(|(x, y)| slope * x + intercept - y)
        .collect();

    let num: f64 = residuals.windows(2).map(|w| (w[1] - w[0]).powi(2)).sum();
    let den: f64 = residuals.iter().skip(1).map(|e| e * e).sum();

    if den == 0.0 || !den.is_finite() {
        return None;
    }
    Some(num / den)
}
