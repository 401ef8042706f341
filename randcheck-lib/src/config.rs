//! Configuration of a multi-sequence test run.
//!
//! [TestConfig] holds everything the [orchestrator](crate::orchestrator::TestOrchestrator) needs:
//! sequence count and length, the analysis parameters, the per-test arguments, retry behaviour
//! and the worker count. Presets are available via [TestMode].

use crate::analysis::{validate_params, AnalysisParams};
use crate::test_runner::check_preconditions;
use crate::tests::approximate_entropy;
use crate::tests::serial::{self, SerialTestArg};
use crate::{Error, Test, TestArgs, BYTE_SIZE};
use std::num::NonZero;
use strum::{Display, EnumIter, EnumString};

/// α: the default significance level.
pub const DEFAULT_SIGNIFICANCE_LEVEL: f64 = 0.01;
/// k: the default count of bins for the uniformity check.
pub const DEFAULT_UNIFORMITY_BINS: usize = 10;
/// The default minimum P-value of the uniformity check.
pub const DEFAULT_MIN_UNIFORMITY_P_VALUE: f64 = 0.0001;

/// Presets for sequence count and length.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum TestMode {
    /// 100 sequences of 400 000 bits. The serial test uses a block length of 14 to fit the
    /// shorter sequences.
    Quick,
    /// 100 sequences of 10^6 bits, as recommended by NIST.
    #[default]
    Standard,
    /// 1000 sequences of 10^6 bits.
    Extended,
}

impl TestMode {
    /// How many independent sequences are tested.
    pub fn sequence_count(self) -> NonZero<usize> {
        match self {
            TestMode::Quick | TestMode::Standard => const { non_zero(100) },
            TestMode::Extended => const { non_zero(1000) },
        }
    }

    /// Length of each sequence, in bits.
    pub fn sequence_length(self) -> NonZero<usize> {
        match self {
            TestMode::Quick => const { non_zero(400_000) },
            TestMode::Standard | TestMode::Extended => const { non_zero(1_000_000) },
        }
    }

    /// The test arguments that fit the sequence length of this mode.
    pub fn test_args(self) -> TestArgs {
        match self {
            TestMode::Quick => TestArgs {
                serial: SerialTestArg::new(14).unwrap_or_default(),
                ..Default::default()
            },
            TestMode::Standard | TestMode::Extended => TestArgs::default(),
        }
    }
}

/// The configuration of a test run.
///
/// You can construct an instance from a preset, changing only some values, like this:
/// ```
/// use randcheck_lib::config::{TestConfig, TestMode};
/// let config = TestConfig {
///     retry_on_failure: false,
///     ..TestConfig::for_mode(TestMode::Quick)
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TestConfig {
    /// m: count of independent sequences per test.
    pub sequence_count: NonZero<usize>,
    /// n: length of each sequence in bits, has to be a multiple of 8.
    pub sequence_length: NonZero<usize>,
    /// α, see [AnalysisParams::significance_level].
    pub significance_level: f64,
    /// k, see [AnalysisParams::uniformity_bins].
    pub uniformity_bins: usize,
    /// See [AnalysisParams::min_uniformity_p_value].
    pub min_uniformity_p_value: f64,
    /// Arguments of the single tests.
    pub test_args: TestArgs,
    /// Run a test a second time with fresh sequences if it fails, to distinguish statistical
    /// variance from systematic bias.
    pub retry_on_failure: bool,
    /// Worker count, `None` for one worker per logical CPU.
    pub max_threads: Option<NonZero<usize>>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self::for_mode(TestMode::default())
    }
}

impl TestConfig {
    /// The configuration preset for the given mode, with default analysis parameters.
    pub fn for_mode(mode: TestMode) -> Self {
        Self {
            sequence_count: mode.sequence_count(),
            sequence_length: mode.sequence_length(),
            significance_level: DEFAULT_SIGNIFICANCE_LEVEL,
            uniformity_bins: DEFAULT_UNIFORMITY_BINS,
            min_uniformity_p_value: DEFAULT_MIN_UNIFORMITY_P_VALUE,
            test_args: mode.test_args(),
            retry_on_failure: true,
            max_threads: None,
        }
    }

    /// The parameters for the [analysis](crate::analysis::analyze).
    pub fn analysis_params(&self) -> AnalysisParams {
        AnalysisParams {
            significance_level: self.significance_level,
            uniformity_bins: self.uniformity_bins,
            min_uniformity_p_value: self.min_uniformity_p_value,
        }
    }

    /// Length of each sequence in bytes.
    pub fn sequence_bytes(&self) -> usize {
        self.sequence_length.get() / BYTE_SIZE
    }

    /// The worker count: [Self::max_threads] or one per logical CPU.
    pub fn thread_count(&self) -> usize {
        self.max_threads
            .map(NonZero::get)
            .unwrap_or_else(num_cpus::get)
    }

    /// Checks the test independent values: analysis parameters and a byte aligned sequence
    /// length.
    pub fn validate(&self) -> Result<(), Error> {
        validate_params(&self.analysis_params())?;

        if self.sequence_length.get() % BYTE_SIZE != 0 {
            return Err(Error::PreconditionViolation(format!(
                "sequence length must be a multiple of {BYTE_SIZE}. Is: {}",
                self.sequence_length
            )));
        }

        Ok(())
    }

    /// Checks that the configuration can be used to run the given test: [Self::validate], the
    /// recommended minimum input length of the test, the hard preconditions of its arguments and
    /// the NIST recommendations on block lengths.
    pub fn validate_for_test(&self, test: Test) -> Result<(), Error> {
        self.validate()?;

        let len_bit = self.sequence_length.get();
        let min_length = test.min_input_length().get();
        if len_bit < min_length {
            return Err(Error::PreconditionViolation(format!(
                "{test}: sequence length must be >= {min_length} bit. Is: {len_bit}"
            )));
        }

        check_preconditions(test, len_bit, &self.test_args)?;

        match test {
            Test::Serial => check_block_length(
                test,
                self.test_args.serial.block_length(),
                serial::max_recommended_block_length(len_bit),
            ),
            Test::ApproximateEntropy => check_block_length(
                test,
                self.test_args.approximate_entropy.block_length(),
                approximate_entropy::max_recommended_block_length(len_bit),
            ),
            _ => Ok(()),
        }
    }
}

const fn non_zero(value: usize) -> NonZero<usize> {
    match NonZero::new(value) {
        Some(v) => v,
        None => panic!("Literal should be non-zero!"),
    }
}

fn check_block_length(test: Test, block_length: u8, max_block_length: usize) -> Result<(), Error> {
    if block_length as usize >= max_block_length {
        Err(Error::PreconditionViolation(format!(
            "{test}: block length must be < {max_block_length} for this sequence length. Is: {block_length}"
        )))
    } else {
        Ok(())
    }
}
