//! The command line arguments for this program.

use clap::ValueEnum;
use randcheck_lib::config::TestMode;
use randcheck_lib::Test;
use serde::{Deserialize, Serialize};

pub mod cmd_args;
pub mod csv;
pub mod toml_config;
pub mod valid_arg;

/// The tests that can be specified. Used both for command line arguments and TOML.
#[derive(Copy, Clone, Debug, PartialEq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArgTest {
    /// Frequency Test
    Frequency,
    /// Frequency Test within a Block
    FrequencyWithinABlock,
    /// Runs Test
    Runs,
    /// Test for the Longest Run of Ones in a Block
    LongestRunOfOnes,
    /// Binary Matrix Rank Test
    BinaryMatrixRank,
    /// Discrete Fourier Transform (Spectral) Test
    SpectralDft,
    /// Maurers Universal Statistical Test
    MaurersUniversalStatistical,
    /// Linear Complexity Test (uncalibrated, only run if requested explicitly)
    LinearComplexity,
    /// Serial Test
    Serial,
    /// Approximate Entropy Test
    ApproximateEntropy,
    /// Cumulative Sums Test
    CumulativeSums,
}

// this implementation is only there to break if a test is added into randcheck_lib.
impl From<Test> for ArgTest {
    fn from(value: Test) -> Self {
        match value {
            Test::Frequency => ArgTest::Frequency,
            Test::FrequencyWithinABlock => ArgTest::FrequencyWithinABlock,
            Test::Runs => ArgTest::Runs,
            Test::LongestRunOfOnes => ArgTest::LongestRunOfOnes,
            Test::BinaryMatrixRank => ArgTest::BinaryMatrixRank,
            Test::SpectralDft => ArgTest::SpectralDft,
            Test::MaurersUniversalStatistical => ArgTest::MaurersUniversalStatistical,
            Test::LinearComplexity => ArgTest::LinearComplexity,
            Test::Serial => ArgTest::Serial,
            Test::ApproximateEntropy => ArgTest::ApproximateEntropy,
            Test::CumulativeSums => ArgTest::CumulativeSums,
        }
    }
}

impl From<ArgTest> for Test {
    fn from(value: ArgTest) -> Self {
        match value {
            ArgTest::Frequency => Test::Frequency,
            ArgTest::FrequencyWithinABlock => Test::FrequencyWithinABlock,
            ArgTest::Runs => Test::Runs,
            ArgTest::LongestRunOfOnes => Test::LongestRunOfOnes,
            ArgTest::BinaryMatrixRank => Test::BinaryMatrixRank,
            ArgTest::SpectralDft => Test::SpectralDft,
            ArgTest::MaurersUniversalStatistical => Test::MaurersUniversalStatistical,
            ArgTest::LinearComplexity => Test::LinearComplexity,
            ArgTest::Serial => Test::Serial,
            ArgTest::ApproximateEntropy => Test::ApproximateEntropy,
            ArgTest::CumulativeSums => Test::CumulativeSums,
        }
    }
}

/// Where the tested bytes come from. Used both for command line arguments and TOML.
#[derive(Copy, Clone, Debug, Default, PartialEq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// The random generator of the operating system.
    #[default]
    Os,
    /// A reproducible pseudo random generator, see `--seed`.
    Seeded,
    /// Previously captured output, read from the input file.
    File,
}

/// The input file formats that can be specified. Used both for command line arguments and TOML.
#[derive(Copy, Clone, Debug, Default, PartialEq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputFormat {
    /// Binary input.
    #[default]
    Binary,
    /// Input is an ASCII text file consisting of only '0' or '1'.
    Ascii,
    /// Input is an ASCII text file consisting of any character. Characters other than '0' or '1'
    /// are skipped.
    AsciiLossy,
}

/// Presets for sequence count and length. Used both for command line arguments and TOML.
#[derive(Copy, Clone, Debug, PartialEq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArgTestMode {
    /// 100 sequences of 400 000 bits
    Quick,
    /// 100 sequences of 1 000 000 bits
    Standard,
    /// 1000 sequences of 1 000 000 bits
    Extended,
}

impl From<ArgTestMode> for TestMode {
    fn from(value: ArgTestMode) -> Self {
        match value {
            ArgTestMode::Quick => TestMode::Quick,
            ArgTestMode::Standard => TestMode::Standard,
            ArgTestMode::Extended => TestMode::Extended,
        }
    }
}
