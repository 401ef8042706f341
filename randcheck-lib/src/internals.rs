//! Internal functions that are used by tests - can be changed anytime

use crate::bits::BitSequence;
use crate::Error;
use rayon::prelude::*;

/// Clamp a P-value into `[0, 1]`. NaN stems from a degenerate statistic and maps to the
/// failing boundary.
pub(crate) fn clamp_p_value(p_value: f64) -> f64 {
    if p_value.is_nan() {
        0.0
    } else {
        p_value.clamp(0.0, 1.0)
    }
}

/// Count of set bits in a slice of bits.
pub(crate) fn count_ones(bits: &[u8]) -> usize {
    bits.par_iter().map(|&bit| bit as usize).sum()
}

/// Returns [Error::PreconditionViolation] if the sequence is shorter than `min_length` bits.
pub(crate) fn check_length(
    data: &BitSequence,
    min_length: usize,
    test_name: &str,
) -> Result<(), Error> {
    check_length_bits(data.len_bit(), min_length, test_name)
}

/// Same as [check_length], with only the bit length at hand.
pub(crate) fn check_length_bits(
    len_bit: usize,
    min_length: usize,
    test_name: &str,
) -> Result<(), Error> {
    if len_bit < min_length {
        Err(Error::PreconditionViolation(format!(
            "{test_name}: sequence length must be >= {min_length} bit. Is: {len_bit}"
        )))
    } else {
        Ok(())
    }
}

/// Pearson's chi-squared statistic of observed category counts against expected probabilities,
/// with `total` observations overall.
///
/// A category with an expected count of zero contributes nothing if it was never observed, and
/// makes the statistic infinite otherwise.
pub(crate) fn chi_squared(observed: &[usize], probabilities: &[f64], total: usize) -> f64 {
    let total = total as f64;

    observed
        .iter()
        .zip(probabilities)
        .map(|(&observed, &probability)| {
            let expected = total * probability;
            let observed = observed as f64;

            if expected <= 0.0 {
                if observed > 0.0 {
                    f64::INFINITY
                } else {
                    0.0
                }
            } else {
                (observed - expected).powi(2) / expected
            }
        })
        .sum()
}

/// Element-wise sum of two count tables, used to reduce parallel folds.
pub(crate) fn merge_counts(mut a: Vec<usize>, b: Vec<usize>) -> Vec<usize> {
    a.iter_mut().zip(b).for_each(|(a, b)| *a += b);
    a
}
