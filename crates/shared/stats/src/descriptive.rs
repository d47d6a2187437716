/// Calculate the mean of a slice of values.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance (n denominator). Defined for a single point.
pub fn population_variance(values: &[f64]) -> Option<f64> {
    let mean_val = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean_val).powi(2)).sum();
    Some(sum_sq / values.len() as f64)
}

/// Population standard deviation.
pub fn population_std(values: &[f64]) -> Option<f64> {
    population_variance(values).map(f64::sqrt)
}

/// Sample standard deviation (n-1 denominator).
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean_val = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean_val).powi(2)).sum();
    Some((sum_sq / (n - 1) as f64).sqrt())
}

/// Central moments (m2, m3, m4), population normalized
fn central_moments(values: &[f64]) -> Option<(f64, f64, f64)> {
    let mean_val = mean(values)?;
    let n = values.len() as f64;
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for v in values {
        let d = v - mean_val;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    Some((m2 / n, m3 / n, m4 / n))
}

/// Biased sample skewness `m3 / m2^1.5`.
pub fn skew(values: &[f64]) -> Option<f64> {
    if values.len() < 3 {
        return None;
    }
    let (m2, m3, _) = central_moments(values)?;
    if m2 <= f64::EPSILON * f64::EPSILON {
        return None;
    }
    Some(m3 / m2.powf(1.5))
}

/// Biased excess kurtosis `m4 / m2^2 - 3` (zero for a normal sample).
pub fn kurtosis(values: &[f64]) -> Option<f64> {
    if values.len() < 4 {
        return None;
    }
    let (m2, _, m4) = central_moments(values)?;
    if m2 <= f64::EPSILON * f64::EPSILON {
        return None;
    }
    Some(m4 / (m2 * m2) - 3.0)
}

/// Pearson correlation coefficient.
pub fn correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mean_x = mean(x)?;
    let mean_y = mean(y)?;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x * var_y).sqrt())
}

/// Index of the first minimum.
pub fn argmin(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, b)) if b <= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

/// Index of the first maximum.
pub fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&values).unwrap(), 5.0);
        assert_relative_eq!(population_std(&values).unwrap(), 2.0);
        assert_relative_eq!(sample_std(&values).unwrap(), (32.0f64 / 7.0).sqrt());
    }

    #[test]
    fn test_insufficient_data() {
        assert!(mean(&[]).is_none());
        assert!(sample_std(&[1.0]).is_none());
        assert!(skew(&[1.0, 2.0]).is_none());
        assert!(kurtosis(&[1.0, 2.0, 3.0]).is_none());
        assert!(correlation(&[1.0], &[1.0]).is_none());
        assert!(argmax(&[]).is_none());
    }

    #[test]
    fn test_single_point_population_std() {
        assert_eq!(population_std(&[100.0]), Some(0.0));
    }

    #[test]
    fn test_skew_sign() {
        let right_tail = [1.0, 1.0, 1.0, 1.0, 10.0];
        assert!(skew(&right_tail).unwrap() > 0.0);
        let symmetric = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(skew(&symmetric).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_kurtosis_of_uniform_grid() {
        // Excess kurtosis of 1..=5 is -1.3
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(kurtosis(&values).unwrap(), -1.3, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_series_has_no_shape() {
        let flat = [3.0; 10];
        assert!(skew(&flat).is_none());
        assert!(kurtosis(&flat).is_none());
        assert!(correlation(&flat, &flat).is_none());
    }

    #[test]
    fn test_correlation() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        assert_relative_eq!(correlation(&x, &y).unwrap(), 1.0, epsilon = 1e-12);
        let z = [8.0, 6.0, 4.0, 2.0];
        assert_relative_eq!(correlation(&x, &z).unwrap(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_arg_extremes_take_first() {
        let values = [3.0, 9.0, 1.0, 9.0, 1.0];
        assert_eq!(argmax(&values), Some(1));
        assert_eq!(argmin(&values), Some(2));
    }
}
