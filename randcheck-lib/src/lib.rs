#![doc = include_str!("../README.md")]

use crate::source::GenerationError;
use crate::tests::approximate_entropy::ApproximateEntropyTestArg;
use crate::tests::binary_matrix_rank::BinaryMatrixRankTestArg;
use crate::tests::frequency_block::FrequencyBlockTestArg;
use crate::tests::linear_complexity::LinearComplexityTestArg;
use crate::tests::longest_run_of_ones::LongestRunOfOnesTestArg;
use crate::tests::maurers_universal_statistical::MaurersUniversalTestArg;
use crate::tests::serial::SerialTestArg;
use std::num::NonZero;
use strum::{Display, EnumIter};
use thiserror::Error;

// internal usage only
pub(crate) mod internals;
#[cfg(test)]
mod unit_tests;

// public exports
pub mod analysis;
pub mod bits;
pub mod config;
pub mod orchestrator;
pub mod source;
pub mod special_functions;
pub mod test_runner;
pub mod tests;

pub use strum::IntoEnumIterator;

// shared data structures

/// How many bits a byte has
const BYTE_SIZE: usize = 8;

/// List of all tests of the battery, used e.g. for automatic running.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, EnumIter, Display)]
#[repr(u8)]
pub enum Test {
    /// See [tests::frequency].
    Frequency = 0,
    /// See [tests::frequency_block].
    FrequencyWithinABlock = 1,
    /// See [tests::runs].
    Runs = 2,
    /// See [tests::longest_run_of_ones].
    LongestRunOfOnes = 3,
    /// See [tests::binary_matrix_rank].
    BinaryMatrixRank = 4,
    /// See [tests::spectral_dft].
    SpectralDft = 5,
    /// See [tests::maurers_universal_statistical]
    MaurersUniversalStatistical = 6,
    /// See [tests::linear_complexity]
    LinearComplexity = 7,
    /// See [tests::serial]
    Serial = 8,
    /// See [tests::approximate_entropy]
    ApproximateEntropy = 9,
    /// See [tests::cumulative_sums]
    CumulativeSums = 10,
}

impl Test {
    /// Whether the P-value mapping of this test is calibrated, i.e. P-values of random input are
    /// uniformly distributed.
    ///
    /// Uncalibrated tests are excluded from the [default battery](Self::default_battery) and only
    /// run when explicitly requested.
    pub fn is_calibrated(self) -> bool {
        !matches!(self, Test::LinearComplexity)
    }

    /// All tests that are run when no explicit selection is made.
    pub fn default_battery() -> impl Iterator<Item = Test> {
        Test::iter().filter(|test| test.is_calibrated())
    }

    /// The recommended minimum input length, in bits. See [get_min_length_for_test].
    pub fn min_input_length(self) -> NonZero<usize> {
        get_min_length_for_test(self)
    }
}

/// All test arguments for use in [test_runner::run_test] and the
/// [orchestrator](orchestrator::TestOrchestrator), prefilled with sane defaults.
///
/// You can construct an instance, leaving all other arguments as the default, like this:
/// ```
/// use std::num::NonZero;
/// use randcheck_lib::TestArgs;
/// use randcheck_lib::tests::frequency_block::FrequencyBlockTestArg;
/// let args = TestArgs {
///     frequency_block: FrequencyBlockTestArg::new(NonZero::new(128).unwrap()),
///     ..Default::default()
/// };
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TestArgs {
    pub frequency_block: FrequencyBlockTestArg,
    pub longest_run_of_ones: LongestRunOfOnesTestArg,
    pub binary_matrix_rank: BinaryMatrixRankTestArg,
    pub maurers_universal: MaurersUniversalTestArg,
    pub linear_complexity: LinearComplexityTestArg,
    pub serial: SerialTestArg,
    pub approximate_entropy: ApproximateEntropyTestArg,
}

/// The common test result type, as used by all tests.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TestResult {
    p_value: f64,
    comment: Option<&'static str>,
}

// private methods
impl TestResult {
    /// A new test result without comment. The P-value is clamped into `[0, 1]`.
    pub(crate) fn new(p_value: f64) -> Self {
        Self {
            p_value: internals::clamp_p_value(p_value),
            comment: None,
        }
    }

    /// A new test result with a comment. The P-value is clamped into `[0, 1]`.
    pub(crate) fn new_with_comment(p_value: f64, comment: &'static str) -> Self {
        Self {
            p_value: internals::clamp_p_value(p_value),
            comment: Some(comment),
        }
    }
}

// public methods
impl TestResult {
    /// The p_value (result of the test), always within `[0, 1]`.
    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    /// To determine if the test passed, based on the given threshold:
    /// The test passes if the [p_value](Self::p_value) is greater or equal to the given
    /// threshold.
    pub fn passed(&self, threshold: f64) -> bool {
        self.p_value >= threshold
    }

    /// Some tests leave a comment about the outcome.
    pub fn comment(&self) -> Option<&'static str> {
        self.comment
    }
}

/// The error type for all operations of this library.
///
/// Statistical failure of a sequence is never an error: it is expressed as a low P-value.
#[derive(Error, Debug)]
pub enum Error {
    /// The random source failed to deliver the requested amount of data.
    #[error(transparent)]
    Generation(#[from] GenerationError),
    /// An input or parameter violates a precondition. The String describes which one.
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),
    /// The worker pool could not be created.
    #[error("Failed to build the worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Returns the recommended minimum input length, in bits, for the specified test.
///
/// The tests themselves accept shorter input as long as the computation is well-defined, but
/// the [configuration](config::TestConfig) rejects sequence lengths below this value.
pub fn get_min_length_for_test(test: Test) -> NonZero<usize> {
    use crate::tests;

    const MIN_LENGTHS: [NonZero<usize>; 11] = [
        tests::frequency::MIN_INPUT_LENGTH,
        tests::frequency_block::MIN_INPUT_LENGTH,
        tests::runs::MIN_INPUT_LENGTH,
        tests::longest_run_of_ones::MIN_INPUT_LENGTH,
        tests::binary_matrix_rank::MIN_INPUT_LENGTH,
        tests::spectral_dft::MIN_INPUT_LENGTH,
        tests::maurers_universal_statistical::MIN_INPUT_LENGTH,
        tests::linear_complexity::MIN_INPUT_LENGTH,
        tests::serial::MIN_INPUT_LENGTH,
        tests::approximate_entropy::MIN_INPUT_LENGTH,
        tests::cumulative_sums::MIN_INPUT_LENGTH,
    ];

    // use the assigned test primitive value as an index
    MIN_LENGTHS[(test as u8) as usize]
}
