//! Dispatch from a [Test] to the matching test function, with the arguments taken from
//! [TestArgs].
//!
//! Tests that compute two P-values (cumulative sums forward/backward, serial) are reduced to the
//! smaller one, which is the conservative choice.

use crate::bits::BitSequence;
use crate::internals::check_length_bits;
use crate::tests::*;
use crate::{Error, Test, TestArgs, TestResult};
use rayon::prelude::*;

/// Runs a single test on the sequence.
pub fn run_test(test: Test, data: &BitSequence, args: &TestArgs) -> Result<TestResult, Error> {
    match test {
        Test::Frequency => frequency::frequency_test(data),
        Test::FrequencyWithinABlock => {
            frequency_block::frequency_block_test(data, args.frequency_block)
        }
        Test::Runs => runs::runs_test(data),
        Test::LongestRunOfOnes => {
            longest_run_of_ones::longest_run_of_ones_test(data, args.longest_run_of_ones)
        }
        Test::BinaryMatrixRank => {
            binary_matrix_rank::binary_matrix_rank_test(data, args.binary_matrix_rank)
        }
        Test::SpectralDft => spectral_dft::spectral_dft_test(data),
        Test::MaurersUniversalStatistical => {
            maurers_universal_statistical::maurers_universal_statistical_test(
                data,
                args.maurers_universal,
            )
        }
        Test::LinearComplexity => {
            linear_complexity::linear_complexity_test(data, args.linear_complexity)
        }
        Test::Serial => serial::serial_test(data, args.serial).map(least_passing),
        Test::ApproximateEntropy => {
            approximate_entropy::approximate_entropy_test(data, args.approximate_entropy)
        }
        Test::CumulativeSums => {
            cumulative_sums::cumulative_sums_test(data).map(least_passing)
        }
    }
}

/// Runs all given tests on the same sequence, in parallel. The results are in the order of the
/// given tests.
pub fn run_tests(
    tests: &[Test],
    data: &BitSequence,
    args: &TestArgs,
) -> Vec<(Test, Result<TestResult, Error>)> {
    tests
        .par_iter()
        .map(|&test| (test, run_test(test, data, args)))
        .collect()
}

/// Checks the hard preconditions of a test for a sequence of the given length, without running
/// it.
pub fn check_preconditions(test: Test, len_bit: usize, args: &TestArgs) -> Result<(), Error> {
    match test {
        Test::Frequency => check_length_bits(len_bit, 1, "frequency test"),
        Test::FrequencyWithinABlock => {
            frequency_block::check_preconditions(len_bit, args.frequency_block)
        }
        Test::Runs => check_length_bits(len_bit, 1, "runs test"),
        Test::LongestRunOfOnes => {
            longest_run_of_ones::check_preconditions(len_bit, args.longest_run_of_ones)
        }
        Test::BinaryMatrixRank => {
            binary_matrix_rank::check_preconditions(len_bit, args.binary_matrix_rank)
        }
        Test::SpectralDft => check_length_bits(len_bit, 2, "spectral DFT test"),
        Test::MaurersUniversalStatistical => {
            maurers_universal_statistical::check_preconditions(len_bit, args.maurers_universal)
        }
        Test::LinearComplexity => {
            linear_complexity::check_preconditions(len_bit, args.linear_complexity)
        }
        Test::Serial => serial::check_preconditions(len_bit, args.serial),
        Test::ApproximateEntropy => {
            approximate_entropy::check_preconditions(len_bit, args.approximate_entropy)
        }
        Test::CumulativeSums => check_length_bits(len_bit, 1, "cumulative sums test"),
    }
}

/// The result with the smaller P-value.
fn least_passing(results: [TestResult; 2]) -> TestResult {
    let [a, b] = results;
    if b.p_value() < a.p_value() {
        b
    } else {
        a
    }
}
