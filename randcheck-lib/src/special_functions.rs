//! Special functions needed to turn test statistics into P-values.
//!
//! All functions are total: arguments outside of the mathematical domain map to the boundary
//! value, NaN is never returned. A NaN argument is treated as the most extreme possible
//! statistic, so that it leads to a failing P-value further down.

use std::f64::consts::SQRT_2;

// Abramowitz & Stegun 7.1.26, absolute error below 1.5e-7
const ERF_P: f64 = 0.327_591_1;
const ERF_COEFFICIENTS: [f64; 5] = [
    0.254_829_592,
    -0.284_496_736,
    1.421_413_741,
    -1.453_152_027,
    1.061_405_429,
];

// Lanczos approximation as used in Numerical Recipes (gammln)
const LANCZOS_COEFFICIENTS: [f64; 6] = [
    76.180_091_729_471_46,
    -86.505_320_329_416_77,
    24.014_098_240_830_91,
    -1.231_739_572_450_155,
    0.120_865_097_386_617_9e-2,
    -0.539_523_938_495_3e-5,
];
const LANCZOS_SERIES_START: f64 = 1.000_000_000_190_015;
const SQRT_TWO_PI: f64 = 2.506_628_274_631_000_5;

/// Relative tolerance for the incomplete gamma series and continued fraction.
const IGAM_TOLERANCE: f64 = 1e-9;
/// Iterations available for small `a`. Larger `a` need about `sqrt(a)` more terms.
const IGAM_BASE_ITERATIONS: usize = 100;
/// Smallest representable value used to avoid divisions by zero in the continued fraction.
const FP_MIN: f64 = 1e-300;

/// The [error function](https://en.wikipedia.org/wiki/Error_function).
///
/// `erf(0) == 0` exactly and `erf(-x) == -erf(x)` for all x.
pub fn erf(x: f64) -> f64 {
    if x.is_nan() {
        return 1.0;
    }
    if x == 0.0 {
        return 0.0;
    }

    (1.0 - erfc_tail(x.abs())).copysign(x)
}

/// The complementary error function: `1 - erf(x)`, within `[0, 2]`.
pub fn erfc(x: f64) -> f64 {
    if x.is_nan() {
        return 0.0;
    }

    if x == 0.0 {
        1.0
    } else if x > 0.0 {
        erfc_tail(x)
    } else {
        2.0 - erfc_tail(-x)
    }
}

/// The A&S rational approximation of erfc for non-negative x.
fn erfc_tail(x: f64) -> f64 {
    let t = 1.0 / (1.0 + ERF_P * x);
    // horner scheme: t * (a1 + t * (a2 + t * (a3 + t * (a4 + t * a5))))
    let polynomial = ERF_COEFFICIENTS
        .iter()
        .rev()
        .fold(0.0, |acc, &coefficient| acc * t + coefficient)
        * t;

    polynomial * f64::exp(-x * x)
}

/// The cumulative distribution function of the standard normal distribution.
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / SQRT_2))
}

/// The natural logarithm of the gamma function, for `x > 0`.
///
/// Non-positive or non-finite arguments return positive infinity.
pub fn ln_gamma(x: f64) -> f64 {
    if x.is_nan() || x <= 0.0 || x.is_infinite() {
        return f64::INFINITY;
    }

    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();

    let mut y = x;
    let series = LANCZOS_COEFFICIENTS
        .iter()
        .fold(LANCZOS_SERIES_START, |series, &coefficient| {
            y += 1.0;
            series + coefficient / y
        });

    -tmp + (SQRT_TWO_PI * series / x).ln()
}

/// The regularized lower incomplete gamma function P(a, x).
///
/// `x <= 0` or `a <= 0` yields 0. The result is always within `[0, 1]` and
/// `igam(a, x) + igamc(a, x) == 1` up to floating point precision.
pub fn igam(a: f64, x: f64) -> f64 {
    let value = match domain_boundary(a, x) {
        Some(igamc_value) => 1.0 - igamc_value,
        None if x < a + 1.0 => gamma_series(a, x),
        None => 1.0 - gamma_continued_fraction(a, x),
    };

    value.clamp(0.0, 1.0)
}

/// The regularized upper incomplete gamma function Q(a, x) = 1 - P(a, x).
///
/// `x <= 0` or `a <= 0` yields 1. The result is always within `[0, 1]`.
pub fn igamc(a: f64, x: f64) -> f64 {
    let value = match domain_boundary(a, x) {
        Some(igamc_value) => igamc_value,
        None if x < a + 1.0 => 1.0 - gamma_series(a, x),
        None => gamma_continued_fraction(a, x),
    };

    value.clamp(0.0, 1.0)
}

/// The value of igamc for arguments at the boundary of (or outside) the domain, `None` if the
/// arguments need to be computed.
fn domain_boundary(a: f64, x: f64) -> Option<f64> {
    if a.is_nan() || x.is_nan() {
        // most extreme statistic
        Some(0.0)
    } else if x <= 0.0 || a <= 0.0 || a.is_infinite() {
        Some(1.0)
    } else if x.is_infinite() {
        Some(0.0)
    } else {
        None
    }
}

/// Maximum iteration count for the incomplete gamma approximations.
fn max_iterations(a: f64) -> usize {
    IGAM_BASE_ITERATIONS + (10.0 * a.sqrt()) as usize
}

/// Series representation of P(a, x), converges quickly for `x < a + 1`.
fn gamma_series(a: f64, x: f64) -> f64 {
    let mut denominator = a;
    let mut term = 1.0 / a;
    let mut sum = term;

    for _ in 0..max_iterations(a) {
        denominator += 1.0;
        term *= x / denominator;
        sum += term;

        if term.abs() < sum.abs() * IGAM_TOLERANCE {
            break;
        }
    }

    sum * f64::exp(a * x.ln() - x - ln_gamma(a))
}

/// Continued fraction representation of Q(a, x) (modified Lentz), converges quickly for
/// `x >= a + 1`.
fn gamma_continued_fraction(a: f64, x: f64) -> f64 {
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / FP_MIN;
    let mut d = 1.0 / b;
    let mut h = d;

    for i in 1..=max_iterations(a) {
        let i = i as f64;
        let an = -i * (i - a);
        b += 2.0;

        d = an * d + b;
        if d.abs() < FP_MIN {
            d = FP_MIN;
        }
        c = b + an / c;
        if c.abs() < FP_MIN {
            c = FP_MIN;
        }

        d = 1.0 / d;
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < IGAM_TOLERANCE {
            break;
        }
    }

    f64::exp(a * x.ln() - x - ln_gamma(a)) * h
}
