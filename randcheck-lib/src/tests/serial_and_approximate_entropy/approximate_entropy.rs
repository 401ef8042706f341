//! The approximate entropy test.
//!
//! This test is similar to the [serial test](crate::tests::serial). It compares the frequency
//! of overlapping blocks with the two block lengths *m* and *m + 1* against the expected result
//! of a random sequence.
//!
//! This test needs a parameter [ApproximateEntropyTestArg]. Check the described constraints there.

use crate::bits::BitSequence;
use crate::internals::{check_length, check_length_bits};
use crate::special_functions::igamc;
use crate::tests::serial_and_approximate_entropy::{
    count_patterns, floor_log2, marginalize, validate_test_arg,
};
use crate::{Error, TestResult};
use rayon::prelude::*;
use std::f64::consts::LN_2;
use std::num::NonZero;

// calculation: minimum block length = 2
// Following relation must be true:
// 2 < (log2(len_bit) as int) - 5
// -> log2(2^8) - 5 = 3
/// The minimum input length for this test.
pub const MIN_INPUT_LENGTH: NonZero<usize> = const {
    match NonZero::new(1 << 8) {
        Some(v) => v,
        None => panic!("Literal should be non-zero!"),
    }
};

/// The argument for the approximate entropy test: the block length in bits to check.
///
/// Argument constraints:
/// 1. the given block length must be >= 2.
/// 2. the given block length must be <= 20, to keep the pattern tables small.
/// 3. the block length should be < (log2([BitSequence::len_bit]) as int) - 5
///
/// Constraints 1 and 2 are checked when creating the arguments.
///
/// Constraint 3 is a NIST recommendation, it is checked by the
/// [configuration](crate::config::TestConfig::validate_for_test), see
/// [max_recommended_block_length]. The test itself only requires the sequence to be longer than
/// the block length.
///
/// The default value for this argument is 10. For constraint 3 to hold, the input length must be
/// at least 2^16 bit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct ApproximateEntropyTestArg(u8);

impl ApproximateEntropyTestArg {
    /// To create a new instance of [ApproximateEntropyTestArg]. This function checks some
    /// constraints, for details, see [ApproximateEntropyTestArg].
    pub fn new(block_length: u8) -> Option<Self> {
        validate_test_arg(block_length).map(Self)
    }

    /// The block length m
    pub fn block_length(&self) -> u8 {
        self.0
    }
}

impl Default for ApproximateEntropyTestArg {
    fn default() -> Self {
        Self(10)
    }
}

/// Block lengths must be strictly smaller than this value for a sequence of the given length,
/// as recommended by NIST.
pub fn max_recommended_block_length(len_bit: usize) -> usize {
    floor_log2(len_bit).saturating_sub(5)
}

/// Checks that the sequence is longer than the block length.
pub fn check_preconditions(len_bit: usize, test_arg: ApproximateEntropyTestArg) -> Result<(), Error> {
    check_length_bits(len_bit, test_arg.0 as usize + 1, "approximate entropy test")
}

/// Approximate Entropy Test - No. 12
///
/// See also the [module docs](crate::tests::approximate_entropy).
/// If the sequence is not longer than the block length, [Error::PreconditionViolation] is raised.
pub fn approximate_entropy_test(
    data: &BitSequence,
    ApproximateEntropyTestArg(block_length): ApproximateEntropyTestArg,
) -> Result<TestResult, Error> {
    check_length(data, block_length as usize + 1, "approximate entropy test")?;

    Ok(approximate_entropy_test_bits(data.as_bits(), block_length))
}

/// The test on raw bits, assumes `2 <= block_length < bits.len()`.
pub(crate) fn approximate_entropy_test_bits(bits: &[u8], block_length: u8) -> TestResult {
    let n = bits.len() as f64;

    // Step 1 is skipped: patterns wrap around to the start, see count_patterns()
    // Step 2: count the frequency of all overlapping (m+1)-bit blocks, the m-bit counts follow
    // from these.
    let frequencies_m1 = count_patterns(bits, block_length + 1);
    let frequencies_m = marginalize(&frequencies_m1);

    // Step 3 + 4: compute phi(m) = sum of pi_i * ln(pi_i) with pi_i = count_i / n, for both
    // block lengths. Patterns that never occur contribute nothing.
    let phi = |frequencies: &[usize]| {
        frequencies
            .par_iter()
            .filter(|&&count| count > 0)
            .map(|&count| {
                let pi = count as f64 / n;
                pi * pi.ln()
            })
            .sum::<f64>()
    };

    // Step 5: compute ApEn(m) = phi(m) - phi(m+1)
    let ap_en = phi(&frequencies_m) - phi(&frequencies_m1);

    // Step 6: compute chi^2 = 2n * (ln(2) - ApEn(m))
    let chi = 2.0 * n * (LN_2 - ap_en);

    // Step 7: compute P-value = igamc(2^(m-1), chi^2 / 2)
    let p_value = igamc(f64::powi(2.0, block_length as i32 - 1), chi / 2.0);

    TestResult::new(p_value)
}
