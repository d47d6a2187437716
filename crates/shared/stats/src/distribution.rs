use std::f64::consts::SQRT_2;

/// Error function.
///
/// Numerical Recipes `erfc` Chebyshev fit, fractional error below 1.2e-7.
pub fn erf(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87
                                    + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let erfc = t * poly.exp();
    if x >= 0.0 { 1.0 - erfc } else { erfc - 1.0 }
}

/// CDF of a normal distribution with mean `mu` and standard deviation `sigma`
pub fn normal_cdf(x: f64, mu: f64, sigma: f64) -> f64 {
    if sigma <= 0.0 {
        return if x < mu { 0.0 } else { 1.0 };
    }
    0.5 * (1.0 + erf((x - mu) / (sigma * SQRT_2)))
}

/// Survival function of the Kolmogorov distribution, `P(K > lambda)`
pub fn kolmogorov_survival(lambda: f64) -> f64 {
    const EPS1: f64 = 1e-6;
    const EPS2: f64 = 1e-16;

    if lambda <= 0.0 {
        return 1.0;
    }

    let a2 = -2.0 * lambda * lambda;
    let mut fac = 2.0;
    let mut sum = 0.0;
    let mut prev_term = 0.0;

    for j in 1..=100 {
        let term = fac * (a2 * (j * j) as f64).exp();
        sum += term;
        if term.abs() <= EPS1 * prev_term || term.abs() <= EPS2 * sum {
            return sum.clamp(0.0, 1.0);
        }
        fac = -fac;
        prev_term = term.abs();
    }

    // Series fails to converge only for tiny lambda, where the tail is 1
    1.0
}
