//! Struct and conversion method for a validated arg.

use crate::cmd_args::RegularArgs;
use crate::toml_config::{
    Merge, TomlConfig, TomlOutput, TomlRun, TomlSource, TomlTest, TomlTestArguments,
};
use crate::{InputFormat, SourceKind};
use randcheck_lib::config::{TestConfig, TestMode};
use randcheck_lib::Test;
use std::path::PathBuf;

/// Which tests are to be run (allowed or blocked)
#[derive(Clone, Debug, PartialEq)]
pub enum TestsToRun {
    AllowList(Vec<Test>),
    BlockList(Vec<Test>),
    All,
}

impl From<crate::cmd_args::TestsToRun> for TestsToRun {
    fn from(value: crate::cmd_args::TestsToRun) -> Self {
        if let Some(tests) = value.tests {
            let tests = tests.into_iter().map(From::from).collect();
            TestsToRun::AllowList(tests)
        } else if let Some(tests) = value.exclude_tests {
            let tests = tests.into_iter().map(From::from).collect();
            TestsToRun::BlockList(tests)
        } else {
            TestsToRun::All
        }
    }
}

impl From<TomlTest> for TestsToRun {
    fn from(value: TomlTest) -> Self {
        if let Some(tests) = value.include {
            let tests = tests.into_iter().map(From::from).collect();
            TestsToRun::AllowList(tests)
        } else if let Some(tests) = value.exclude {
            let tests = tests.into_iter().map(From::from).collect();
            TestsToRun::BlockList(tests)
        } else {
            TestsToRun::All
        }
    }
}

/// Where the tested bytes come from, with everything needed to open the source.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceConfig {
    /// The operating system generator
    Os,
    /// Seeded pseudo random generator
    Seeded(u64),
    /// An input file with the given format
    File { path: PathBuf, format: InputFormat },
}

/// A validated config with a valid state that can be used to run tests.
#[derive(Clone, Debug)]
pub struct ValidatedConfig {
    /// The source of the tested bytes.
    pub source: SourceConfig,
    /// The exact tests to be run.
    pub tests_to_run: TestsToRun,
    /// Sequence count and length, analysis parameters and finished test arguments
    pub test_config: TestConfig,
    /// Run the FIPS 140-2 tests instead of the battery.
    pub fips: bool,
    /// An optional path to save the outputs to.
    pub output_path: Option<PathBuf>,
    /// Write console output about individual tests, else only summaries.
    pub console_output: bool,
}

impl ValidatedConfig {
    /// Creates a valid config from the command line arguments only.
    pub fn try_from_cmd_args(args: RegularArgs) -> Result<Self, &'static str> {
        Self::try_from_toml(TomlConfig::default(), args)
    }

    /// Creates a valid config from the specified toml configuration, uses overrides from the
    /// command line.
    pub fn try_from_toml(toml: TomlConfig, args: RegularArgs) -> Result<Self, &'static str> {
        let TomlConfig {
            source:
                TomlSource {
                    kind,
                    input_file,
                    input_format,
                    seed,
                },
            run:
                TomlRun {
                    mode,
                    sequence_count,
                    sequence_length,
                    significance_level,
                    uniformity_bins,
                    min_uniformity_p_value,
                    retry_on_failure,
                    threads,
                    fips,
                },
            test,
            output,
            arguments,
        } = toml;

        let TomlOutput {
            path: output_path,
            no_console,
        } = output.unwrap_or_default();

        let RegularArgs {
            source: args_kind,
            input_file: args_input_file,
            input_format: args_input_format,
            seed: args_seed,
            mode: args_mode,
            sequence_count: args_sequence_count,
            sequence_length: args_sequence_length,
            significance_level: args_significance_level,
            uniformity_bins: args_uniformity_bins,
            min_uniformity_p_value: args_min_uniformity_p_value,
            no_retry,
            threads: args_threads,
            fips: args_fips,
            output_path: args_output_path,
            tests_to_run,
            overrides,
            no_console: args_no_console,
        } = args;

        // cmd args overwrite everywhere
        let input_file = args_input_file.or(input_file);
        let source = match args_kind.or(kind) {
            Some(SourceKind::Os) => SourceConfig::Os,
            Some(SourceKind::Seeded) => SourceConfig::Seeded(args_seed.or(seed).unwrap_or(0)),
            // an input file without explicit source kind: read the file
            Some(SourceKind::File) | None if input_file.is_some() => SourceConfig::File {
                path: input_file.ok_or("The input file is unspecified")?,
                format: args_input_format.or(input_format).unwrap_or_default(),
            },
            Some(SourceKind::File) => {
                return Err(
                    "The input file is unspecified in the config file and the cmd args!",
                )
            }
            None => SourceConfig::Os,
        };

        let mode: TestMode = args_mode.or(mode).map(From::from).unwrap_or_default();
        let base = TestConfig::for_mode(mode);

        let test_args = match merge_arguments(arguments, parse_overrides(overrides)?) {
            Some(arguments) => arguments.apply_to(base.test_args)?,
            None => base.test_args,
        };

        let test_config = TestConfig {
            sequence_count: args_sequence_count
                .or(sequence_count)
                .unwrap_or(base.sequence_count),
            sequence_length: args_sequence_length
                .or(sequence_length)
                .unwrap_or(base.sequence_length),
            significance_level: args_significance_level
                .or(significance_level)
                .unwrap_or(base.significance_level),
            uniformity_bins: args_uniformity_bins
                .or(uniformity_bins)
                .unwrap_or(base.uniformity_bins),
            min_uniformity_p_value: args_min_uniformity_p_value
                .or(min_uniformity_p_value)
                .unwrap_or(base.min_uniformity_p_value),
            test_args,
            retry_on_failure: !no_retry && retry_on_failure.unwrap_or(base.retry_on_failure),
            max_threads: args_threads.or(threads),
        };

        if test_config.validate().is_err() {
            return Err("Invalid run configuration: the sequence length must be a multiple of 8, \
                the significance level within (0, 1), the minimum uniformity P-value within [0, 1] \
                and at least 2 uniformity bins are needed");
        }

        let tests_to_run: TestsToRun = {
            let cmd_tests_to_run = tests_to_run.into();

            if let TestsToRun::All = &cmd_tests_to_run {
                // no command line switch was specified, use the toml file
                test.into()
            } else {
                cmd_tests_to_run
            }
        };

        Ok(Self {
            source,
            tests_to_run,
            test_config,
            fips: args_fips || fips.unwrap_or(false),
            output_path: args_output_path.or(output_path),
            console_output: !(args_no_console || no_console),
        })
    }
}

/// Parse the overrides given via command line
fn parse_overrides(
    overrides: Option<Vec<String>>,
) -> Result<Option<TomlTestArguments>, &'static str> {
    let Some(overrides) =
        overrides.and_then(|overrides| overrides.into_iter().reduce(|a, b| a + "\n" + &b))
    else {
        return Ok(None);
    };

    toml::from_str(&overrides)
        .map(Some)
        .map_err(|_| "argument overrides is not valid TOML")
}

/// The overrides replace single values of the config file arguments.
fn merge_arguments(
    mut arguments: Option<TomlTestArguments>,
    overrides: Option<TomlTestArguments>,
) -> Option<TomlTestArguments> {
    arguments.merge(overrides);
    arguments
}
