//! TOML configuration file.

use crate::{ArgTest, ArgTestMode, InputFormat, SourceKind};
use randcheck_lib::tests::approximate_entropy::ApproximateEntropyTestArg;
use randcheck_lib::tests::binary_matrix_rank::BinaryMatrixRankTestArg;
use randcheck_lib::tests::frequency_block::FrequencyBlockTestArg;
use randcheck_lib::tests::linear_complexity::LinearComplexityTestArg;
use randcheck_lib::tests::longest_run_of_ones::LongestRunOfOnesTestArg;
use randcheck_lib::tests::maurers_universal_statistical::MaurersUniversalTestArg;
use randcheck_lib::tests::serial::SerialTestArg;
use randcheck_lib::TestArgs;
use serde::{Deserialize, Serialize};
use std::num::NonZero;
use std::path::PathBuf;

/// Struct for the TOML configuration file, the constraints of CmdArgs are not validated here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TomlConfig {
    pub source: TomlSource,
    pub run: TomlRun,
    pub test: TomlTest,
    pub output: Option<TomlOutput>,
    // each argument is optional
    pub arguments: Option<TomlTestArguments>,
}

/// Source of the tested bytes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TomlSource {
    pub kind: Option<SourceKind>,
    pub input_file: Option<PathBuf>,
    pub input_format: Option<InputFormat>,
    pub seed: Option<u64>,
}

/// Sequence count and length, analysis parameters, retries and workers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TomlRun {
    pub mode: Option<ArgTestMode>,
    pub sequence_count: Option<NonZero<usize>>,
    pub sequence_length: Option<NonZero<usize>>,
    pub significance_level: Option<f64>,
    pub uniformity_bins: Option<usize>,
    pub min_uniformity_p_value: Option<f64>,
    pub retry_on_failure: Option<bool>,
    pub threads: Option<NonZero<usize>>,
    pub fips: Option<bool>,
}

/// Tests to run: allowlist or blocklist
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TomlTest {
    // include tests overrides exclude tests
    pub include: Option<Vec<ArgTest>>,
    pub exclude: Option<Vec<ArgTest>>,
}

/// Output: CSV path and console output
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TomlOutput {
    pub path: Option<PathBuf>,
    pub no_console: bool,
}

/// Copies all fields that are set in `other` into `self`.
pub trait Merge {
    fn merge(&mut self, other: Self);
}

impl<T: Merge> Merge for Option<T> {
    fn merge(&mut self, other: Self) {
        let Some(other) = other else {
            return;
        };

        match self {
            Some(outer) => outer.merge(other),
            None => *self = Some(other),
        }
    }
}

/// Implements [Merge] for a struct of only `Option` fields (or mergeable fields).
macro_rules! impl_merge {
    ($name:ident { $($field:ident),+ $(,)? }) => {
        impl Merge for $name {
            fn merge(&mut self, other: Self) {
                $(
                    merge_field(&mut self.$field, other.$field);
                )+
            }
        }
    };
}

fn merge_field<T>(outer: &mut Option<T>, new_data: Option<T>) {
    if new_data.is_some() {
        *outer = new_data;
    }
}

/// Test arguments for the test runner. Also used in cmd line overrides.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TomlTestArguments {
    pub frequency_block: Option<TomlFrequencyBlock>,
    pub longest_run_of_ones: Option<TomlLongestRunOfOnes>,
    pub binary_matrix_rank: Option<TomlBinaryMatrixRank>,
    pub maurers_universal: Option<TomlMaurersUniversal>,
    pub linear_complexity: Option<TomlLinearComplexity>,
    pub serial: Option<TomlSerialApproximateEntropy>,
    pub approximate_entropy: Option<TomlSerialApproximateEntropy>,
}

impl Merge for TomlTestArguments {
    fn merge(&mut self, other: Self) {
        self.frequency_block.merge(other.frequency_block);
        self.longest_run_of_ones.merge(other.longest_run_of_ones);
        self.binary_matrix_rank.merge(other.binary_matrix_rank);
        self.maurers_universal.merge(other.maurers_universal);
        self.linear_complexity.merge(other.linear_complexity);
        self.serial.merge(other.serial);
        self.approximate_entropy.merge(other.approximate_entropy);
    }
}

impl TomlTestArguments {
    /// Replaces the arguments in `base` that are set in this struct.
    pub fn apply_to(self, base: TestArgs) -> Result<TestArgs, &'static str> {
        let TomlTestArguments {
            frequency_block,
            longest_run_of_ones,
            binary_matrix_rank,
            maurers_universal,
            linear_complexity,
            serial,
            approximate_entropy,
        } = self;

        let frequency_block = match frequency_block {
            None => base.frequency_block,
            Some(arg) => match (arg.choose_automatically, arg.block_length) {
                (_, None) | (Some(true), _) => FrequencyBlockTestArg::ChooseAutomatically,
                (Some(false), Some(block_length)) | (None, Some(block_length)) => {
                    FrequencyBlockTestArg::new(block_length)
                }
            },
        };

        let longest_run_of_ones = match longest_run_of_ones.and_then(|arg| arg.block_length) {
            None => base.longest_run_of_ones,
            Some(8) => LongestRunOfOnesTestArg::Block8,
            Some(128) => LongestRunOfOnesTestArg::Block128,
            Some(10_000) => LongestRunOfOnesTestArg::Block10000,
            Some(_) => {
                return Err("Config file: longest-run-of-ones.block-length must be 8, 128 or 10000")
            }
        };

        let binary_matrix_rank = match binary_matrix_rank {
            None => base.binary_matrix_rank,
            Some(arg) => BinaryMatrixRankTestArg::new(
                arg.rows.unwrap_or(base.binary_matrix_rank.rows()),
                arg.columns.unwrap_or(base.binary_matrix_rank.columns()),
            )
            .ok_or("Config file: invalid value for binary-matrix-rank")?,
        };

        let maurers_universal = match maurers_universal {
            None | Some(TomlMaurersUniversal {
                block_length: None, ..
            }) => base.maurers_universal,
            Some(TomlMaurersUniversal {
                block_length: Some(block_length),
                init_blocks,
            }) => MaurersUniversalTestArg::new(
                block_length,
                init_blocks.unwrap_or(10 << block_length.min(16)),
            )
            .ok_or("Config file: invalid value for maurers-universal")?,
        };

        let linear_complexity = match linear_complexity.and_then(|arg| arg.block_length) {
            None => base.linear_complexity,
            Some(block_length) => LinearComplexityTestArg::new(block_length)
                .ok_or("Config file: invalid value for linear-complexity.block-length")?,
        };

        let serial = match serial.and_then(|arg| arg.block_length) {
            None => base.serial,
            Some(block_length) => SerialTestArg::new(block_length)
                .ok_or("Config file: invalid value for serial.block-length")?,
        };

        let approximate_entropy = match approximate_entropy.and_then(|arg| arg.block_length) {
            None => base.approximate_entropy,
            Some(block_length) => ApproximateEntropyTestArg::new(block_length)
                .ok_or("Config file: invalid value for approximate-entropy.block-length")?,
        };

        Ok(TestArgs {
            frequency_block,
            longest_run_of_ones,
            binary_matrix_rank,
            maurers_universal,
            linear_complexity,
            serial,
            approximate_entropy,
        })
    }
}

/// Test argument for the Frequency test within a block.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TomlFrequencyBlock {
    pub block_length: Option<NonZero<usize>>,
    pub choose_automatically: Option<bool>,
}

impl_merge!(TomlFrequencyBlock {
    block_length,
    choose_automatically
});

/// Test argument for the longest run of ones test: 8, 128 or 10000.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TomlLongestRunOfOnes {
    pub block_length: Option<usize>,
}

impl_merge!(TomlLongestRunOfOnes { block_length });

/// Test argument for the binary matrix rank test.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TomlBinaryMatrixRank {
    pub rows: Option<usize>,
    pub columns: Option<usize>,
}

impl_merge!(TomlBinaryMatrixRank { rows, columns });

/// Test argument for Maurer's universal statistical test. Without a block length, the parameters
/// are chosen automatically.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TomlMaurersUniversal {
    pub block_length: Option<u8>,
    pub init_blocks: Option<usize>,
}

impl_merge!(TomlMaurersUniversal {
    block_length,
    init_blocks
});

/// Test argument for the linear complexity test.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TomlLinearComplexity {
    pub block_length: Option<usize>,
}

impl_merge!(TomlLinearComplexity { block_length });

/// Test argument for the serial test and the approximate entropy test.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TomlSerialApproximateEntropy {
    pub block_length: Option<u8>,
}

impl_merge!(TomlSerialApproximateEntropy { block_length });
