//! Everything necessary for command line arguments.

use crate::{ArgTest, ArgTestMode, InputFormat, SourceKind};
use clap::{Args, Parser};
use std::num::NonZero;
use std::path::PathBuf;

/// The command line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct CmdArgs {
    /// Path to an optional configuration file.
    ///
    /// The configuration written in the config file can be overridden by command line switches.
    #[arg(short, long)]
    pub config_file: Option<PathBuf>,
    #[command(flatten)]
    pub regular_args: RegularArgs,
}

/// The "regular" command line arguments (everything except for config file)
#[derive(Debug, Clone, Default, Args)]
#[group(required = false, multiple = true)]
pub struct RegularArgs {
    /// Where the tested bytes come from. Default: os.
    #[arg(short, long)]
    pub source: Option<SourceKind>,
    /// Path to the input file. Required for source "file".
    #[arg(short, long = "input")]
    pub input_file: Option<PathBuf>,
    /// The input file format. Default: binary.
    #[arg(short = 'f', long)]
    pub input_format: Option<InputFormat>,
    /// The seed for source "seeded". Default: 0.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Preset for sequence count and length. Default: standard.
    #[arg(short, long)]
    pub mode: Option<ArgTestMode>,
    /// Count of independent sequences per test, overrides the mode.
    #[arg(short = 'n', long)]
    pub sequence_count: Option<NonZero<usize>>,
    /// Length of each sequence in bits, overrides the mode. Must be a multiple of 8.
    #[arg(short = 'l', long)]
    pub sequence_length: Option<NonZero<usize>>,
    /// A sequence passes a test if its P-value is at least this value. Default: 0.01.
    #[arg(short = 'a', long)]
    pub significance_level: Option<f64>,
    /// Count of bins for the uniformity check of the P-values. Default: 10.
    #[arg(long)]
    pub uniformity_bins: Option<usize>,
    /// Minimum P-value of the uniformity check. Default: 0.0001.
    #[arg(long)]
    pub min_uniformity_p_value: Option<f64>,
    /// Do not repeat failed tests with fresh sequences.
    #[arg(long)]
    pub no_retry: bool,
    /// Worker count, default: one per logical CPU.
    #[arg(short = 'j', long)]
    pub threads: Option<NonZero<usize>>,
    /// Run the FIPS 140-2 tests on one 20 000 bit block instead of the NIST battery.
    #[arg(long)]
    pub fips: bool,
    /// Optional path to save the results to.
    ///
    /// If given, the results will be saved in CSV format with ';' delimiter and the following
    /// columns: test; sequences; passing; expected passing; uniformity p-value; PASS/FAIL;
    /// retried
    ///
    /// If a test was retried, the columns describe the retry.
    #[arg(short, long = "output")]
    pub output_path: Option<PathBuf>,
    /// The tests to run: either include specific tests or exclude specific tests, if neither is
    /// set: run the default battery.
    #[command(flatten)]
    pub tests_to_run: TestsToRun,
    /// Test argument overrides in TOML format.
    ///
    /// Use the same format as the config file, key 'arguments' is implied.
    /// e.g. 'serial.block-length = 12'.
    #[arg(long, value_delimiter = ',')]
    pub overrides: Option<Vec<String>>,
    /// Reduce the console output to only the summary (either all tests passed or not).
    #[arg(long)]
    pub no_console: bool,
}

/// Which tests are to be run. Allows only one of these options to be used.
#[derive(Debug, Clone, Default, Args)]
#[group(required = false, multiple = false)]
pub struct TestsToRun {
    /// Run only the specified tests.
    ///
    /// If neither this option nor '--exclude-tests' is specified, the default battery (all
    /// calibrated tests) is run, except for those whose input length requirements are not
    /// satisfied.
    #[arg(short, long, value_delimiter = ',')]
    pub tests: Option<Vec<ArgTest>>,
    /// Run the default battery except for the excluded tests.
    /// Tests whose input length requirements are not satisfied, are skipped.
    #[arg(short, long, value_delimiter = ',')]
    pub exclude_tests: Option<Vec<ArgTest>>,
}
