//! Log-space statistics used by the tag scores.
//!
//! Everything combinatorial is computed as a logarithm so that spectra with
//! tens of thousands of possible ion positions do not overflow, and tail
//! probabilities are turned into scores without ever leaving log space.

use std::f64::consts::{
    LN_10,
    PI,
    SQRT_2,
};

/// Scores are capped here when a p-value underflows.
pub const MAX_SCORE: f64 = 50.0;

/// Lanczos approximation of `ln(Gamma(x))` (g = 5, 6 coefficients).
///
/// Returns `f64::INFINITY` for non-positive `x`.
///
/// ```
/// use tagseek::scoring::math::ln_gamma;
///
/// assert!(ln_gamma(1.0).abs() < 1e-10);
/// assert!((ln_gamma(5.0) - 24.0_f64.ln()).abs() < 1e-10);
/// ```
pub fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 6] = [
        76.180_091_729_471_46,
        -86.505_320_329_416_77,
        24.014_098_240_830_91,
        -1.231_739_572_450_155,
        0.001_208_650_973_866_179,
        -5.395_239_384_953e-6,
    ];

    if x <= 0.0 {
        return f64::INFINITY;
    }

    let z = x - 1.0;
    let mut sum = 1.000_000_000_190_015_f64;
    for (i, &c) in COEFFS.iter().enumerate() {
        sum += c / (z + 1.0 + i as f64);
    }

    let t = z + 5.5;
    0.5 * (2.0 * PI).ln() + (z + 0.5) * t.ln() - t + sum.ln()
}

/// `ln(n!)`
pub fn ln_factorial(n: u64) -> f64 {
    if n < 2 {
        return 0.0;
    }
    ln_gamma(n as f64 + 1.0)
}

/// `ln(n choose k)`, negative infinity when `k > n`.
pub fn ln_binomial(n: u64, k: u64) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    ln_factorial(n) - ln_factorial(k) - ln_factorial(n - k)
}

const ERFC_COEFFS: [f64; 10] = [
    -1.265_512_23,
    1.000_023_68,
    0.374_091_96,
    0.096_784_18,
    -0.186_288_06,
    0.278_868_07,
    -1.135_203_98,
    1.488_515_87,
    -0.822_152_23,
    0.170_872_77,
];

/// `ln(erfc(x))` for `x >= 0`, without underflow in the far tail.
///
/// Chebyshev fit with fractional error below 1.2e-7 everywhere.
fn ln_erfc_nonnegative(x: f64) -> f64 {
    let t = 1.0 / (1.0 + 0.5 * x);
    let poly = ERFC_COEFFS
        .iter()
        .rev()
        .fold(0.0, |acc, &c| acc * t + c);
    t.ln() - x * x + poly
}

/// `ln(1 - Phi(z))` where `Phi` is the standard normal CDF.
///
/// ```
/// use tagseek::scoring::math::ln_normal_upper_tail;
///
/// assert!((ln_normal_upper_tail(0.0) - 0.5_f64.ln()).abs() < 1e-6);
/// // Far tails stay finite instead of collapsing to ln(0)
/// assert!(ln_normal_upper_tail(60.0).is_finite());
/// ```
pub fn ln_normal_upper_tail(z: f64) -> f64 {
    let x = z / SQRT_2;
    if x >= 0.0 {
        0.5_f64.ln() + ln_erfc_nonnegative(x)
    } else {
        (1.0 - 0.5 * ln_erfc_nonnegative(-x).exp()).ln()
    }
}

/// `ln(sum(exp(x)))` over the values, stable for very negative inputs.
pub fn log_sum_exp(values: impl IntoIterator<Item = f64>) -> f64 {
    let values: Vec<f64> = values.into_iter().collect();
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}

/// `ln P(X >= k)` for `X ~ Hypergeometric(population, successes, draws)`.
///
/// ```
/// use tagseek::scoring::math::hypergeometric_upper_tail_ln;
///
/// // Drawing 2 out of 4 items where 2 are marked: P(both marked) = 1/6
/// let ln_p = hypergeometric_upper_tail_ln(4, 2, 2, 2);
/// assert!((ln_p.exp() - 1.0 / 6.0).abs() < 1e-9);
/// ```
pub fn hypergeometric_upper_tail_ln(
    population: u64,
    successes: u64,
    draws: u64,
    observed: u64,
) -> f64 {
    let successes = successes.min(population);
    let draws = draws.min(population);
    let failures = population - successes;
    let lowest = draws.saturating_sub(failures);
    let highest = draws.min(successes);

    if observed > highest {
        return f64::NEG_INFINITY;
    }
    if observed <= lowest {
        return 0.0;
    }

    let ln_total = ln_binomial(population, draws);
    let terms = (observed..=highest)
        .map(|i| ln_binomial(successes, i) + ln_binomial(failures, draws - i) - ln_total);
    log_sum_exp(terms).min(0.0)
}

/// Converts a natural-log p-value into `-log10(p)`, clamped to
/// `[0, MAX_SCORE]`. NaN maps to 0.
pub fn neg_log10_from_ln(ln_p: f64) -> f64 {
    if ln_p.is_nan() {
        return 0.0;
    }
    (-ln_p / LN_10).clamp(0.0, MAX_SCORE)
}
