//! Aggregation of the P-values of many independent sequences into one verdict per test.
//!
//! Two checks are applied, as described in section 4.2 of NIST SP 800-22:
//!
//! 1. **Proportion of passing sequences.** With significance level α and m sequences, the count of
//!    sequences with a P-value >= α has to lie within the confidence interval
//!    `p̂ ± 3 * sqrt(p̂ * (1 - p̂) / m)`, `p̂ = 1 - α`. For α = 0.01 and m = 100, at least 97
//!    sequences have to pass. Too many passing sequences fail as well.
//! 2. **Uniformity of the P-values.** The P-values are sorted into k equally sized bins over
//!    `[0, 1]` (1.0 lands in the last bin), a chi-squared test with k - 1 degrees of freedom
//!    yields the P-value of the P-values, P_T. The test passes if P_T is at least the configured
//!    minimum (1e-4 by default).

use crate::config::{
    DEFAULT_MIN_UNIFORMITY_P_VALUE, DEFAULT_SIGNIFICANCE_LEVEL, DEFAULT_UNIFORMITY_BINS,
};
use crate::special_functions::igamc;
use crate::{Error, Test};
use std::fmt;
use std::ops::RangeInclusive;

/// Parameters of the multi-sequence analysis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AnalysisParams {
    /// α: a sequence passes a test if its P-value is at least this value.
    pub significance_level: f64,
    /// k: count of bins for the uniformity check, at least 2.
    pub uniformity_bins: usize,
    /// Minimum P_T for the uniformity check to pass.
    pub min_uniformity_p_value: f64,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            significance_level: DEFAULT_SIGNIFICANCE_LEVEL,
            uniformity_bins: DEFAULT_UNIFORMITY_BINS,
            min_uniformity_p_value: DEFAULT_MIN_UNIFORMITY_P_VALUE,
        }
    }
}

/// The analysis of one test over many sequences.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiSequenceResult {
    test: Test,
    p_values: Box<[f64]>,
    passing: usize,
    expected_passing: RangeInclusive<usize>,
    histogram: Box<[usize]>,
    uniformity_p_value: f64,
    params: AnalysisParams,
}

impl MultiSequenceResult {
    /// The analysed test
    pub fn test(&self) -> Test {
        self.test
    }

    /// The P-values of all sequences, in the order they were given.
    pub fn p_values(&self) -> &[f64] {
        &self.p_values
    }

    /// Count of sequences
    pub fn sequence_count(&self) -> usize {
        self.p_values.len()
    }

    /// Count of sequences with a P-value >= α.
    pub fn passing(&self) -> usize {
        self.passing
    }

    /// The acceptable range of [Self::passing].
    pub fn expected_passing(&self) -> RangeInclusive<usize> {
        self.expected_passing.clone()
    }

    /// The count of P-values per uniformity bin.
    pub fn histogram(&self) -> &[usize] {
        &self.histogram
    }

    /// P_T, the P-value of the uniformity chi-squared test.
    pub fn uniformity_p_value(&self) -> f64 {
        self.uniformity_p_value
    }

    /// The parameters this result was computed with.
    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    /// If the proportion of passing sequences lies within the confidence interval.
    pub fn proportion_passed(&self) -> bool {
        self.expected_passing.contains(&self.passing)
    }

    /// If P_T is at least the configured minimum.
    pub fn uniformity_passed(&self) -> bool {
        self.uniformity_p_value >= self.params.min_uniformity_p_value
    }

    /// Overall verdict: both checks passed.
    pub fn passed(&self) -> bool {
        self.proportion_passed() && self.uniformity_passed()
    }
}

impl fmt::Display for MultiSequenceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = |passed: bool| if passed { "PASS" } else { "FAIL" };

        writeln!(
            f,
            "  proportion: {}/{} passed (acceptable {}..={}, alpha = {})  {}",
            self.passing,
            self.sequence_count(),
            self.expected_passing.start(),
            self.expected_passing.end(),
            self.params.significance_level,
            verdict(self.proportion_passed())
        )?;
        writeln!(
            f,
            "  uniformity: P_T = {:.6} (minimum {})  {}",
            self.uniformity_p_value,
            self.params.min_uniformity_p_value,
            verdict(self.uniformity_passed())
        )?;
        write!(f, "  histogram: ")?;
        for count in self.histogram.iter() {
            write!(f, " {count:>4}")?;
        }
        Ok(())
    }
}

/// Analyse the P-values of one test over many sequences.
///
/// An empty list or a value outside of `[0, 1]` (including NaN) raises
/// [Error::PreconditionViolation], as do invalid parameters.
pub fn analyze(
    test: Test,
    p_values: Vec<f64>,
    params: &AnalysisParams,
) -> Result<MultiSequenceResult, Error> {
    validate_params(params)?;

    if p_values.is_empty() {
        return Err(Error::PreconditionViolation(format!(
            "analysis of {test}: no P-values given"
        )));
    }
    if let Some((idx, value)) = p_values
        .iter()
        .enumerate()
        .find(|(_, value)| !(0.0..=1.0).contains(*value))
    {
        return Err(Error::PreconditionViolation(format!(
            "analysis of {test}: P-value {value} at index {idx} is outside of [0, 1]"
        )));
    }

    let passing = p_values
        .iter()
        .filter(|&&p_value| p_value >= params.significance_level)
        .count();
    let expected_passing = proportion_interval(p_values.len(), params.significance_level);
    let histogram = histogram(&p_values, params.uniformity_bins);
    let uniformity_p_value = uniformity_p_value(&histogram);

    Ok(MultiSequenceResult {
        test,
        p_values: p_values.into_boxed_slice(),
        passing,
        expected_passing,
        histogram,
        uniformity_p_value,
        params: *params,
    })
}

/// The acceptable count of passing sequences out of `sequence_count`, for significance level α:
/// `ceil(lower * m)..=min(m, floor(upper * m))` with `p̂ ± 3 * sqrt(p̂ * α / m)`, `p̂ = 1 - α`.
pub fn proportion_interval(sequence_count: usize, significance_level: f64) -> RangeInclusive<usize> {
    let m = sequence_count as f64;
    let p_hat = 1.0 - significance_level;
    let deviation = 3.0 * f64::sqrt(p_hat * significance_level / m);

    let lower = ((p_hat - deviation) * m).ceil().max(0.0) as usize;
    let upper = usize::min(sequence_count, ((p_hat + deviation) * m).floor() as usize);

    lower..=upper
}

/// Sort the P-values into `bins` equally sized bins over `[0, 1]`. Bin i holds the values in
/// `[i / k, (i + 1) / k)`, the last bin also holds 1.0.
pub fn histogram(p_values: &[f64], bins: usize) -> Box<[usize]> {
    let mut histogram = vec![0_usize; bins].into_boxed_slice();

    for &p_value in p_values {
        let bin = usize::min((p_value * bins as f64) as usize, bins - 1);
        histogram[bin] += 1;
    }

    histogram
}

/// P_T of a histogram: `igamc((k - 1) / 2, chi^2 / 2)` with
/// `chi^2 = sum((F_i - m / k)^2 / (m / k))`.
pub fn uniformity_p_value(histogram: &[usize]) -> f64 {
    let bins = histogram.len();
    let expected = histogram.iter().sum::<usize>() as f64 / bins as f64;

    let chi = histogram
        .iter()
        .map(|&count| (count as f64 - expected).powi(2) / expected)
        .sum::<f64>();

    igamc((bins - 1) as f64 / 2.0, chi / 2.0)
}

/// Checks that the parameters describe a meaningful analysis.
pub(crate) fn validate_params(params: &AnalysisParams) -> Result<(), Error> {
    if !(params.significance_level > 0.0 && params.significance_level < 1.0) {
        return Err(Error::PreconditionViolation(format!(
            "significance level must be within (0, 1). Is: {}",
            params.significance_level
        )));
    }
    if params.uniformity_bins < 2 {
        return Err(Error::PreconditionViolation(format!(
            "uniformity bin count must be >= 2. Is: {}",
            params.uniformity_bins
        )));
    }
    if !(0.0..=1.0).contains(&params.min_uniformity_p_value) {
        return Err(Error::PreconditionViolation(format!(
            "minimum uniformity P-value must be within [0, 1]. Is: {}",
            params.min_uniformity_p_value
        )));
    }

    Ok(())
}
