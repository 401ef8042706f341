use anyhow::Context;
use clap::Parser;
use randcheck_cmd::cmd_args::CmdArgs;
use randcheck_cmd::csv::CsvFile;
use randcheck_cmd::toml_config::TomlConfig;
use randcheck_cmd::valid_arg::{SourceConfig, TestsToRun, ValidatedConfig};
use randcheck_cmd::InputFormat;
use randcheck_lib::bits::BitSequence;
use randcheck_lib::config::TestConfig;
use randcheck_lib::orchestrator::{TestOrchestrator, TestReport};
use randcheck_lib::source::{OsRandomSource, RandomSource, ReaderSource, SeededSource};
use randcheck_lib::tests::fips_140_2::{fips_140_2_test, SEQUENCE_LENGTH};
use randcheck_lib::Test;
use std::fs;
use std::io::Cursor;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Main function.
///
/// On success: prints the test reports to stdout, exit code SUCCESS if all tests passed, else
/// FAILURE.
/// On error: prints the error to stderr, exit code FAILURE.
///
/// This program takes some arguments and an optional config file, use `--help`.
fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let CmdArgs {
        config_file,
        regular_args,
    } = CmdArgs::parse();

    // parse configuration
    let config = if let Some(config_file) = config_file {
        let toml = fs::read_to_string(&config_file)
            .with_context(|| format!("Failed to read config file \"{}\"", config_file.display()))?;

        let toml_config: TomlConfig =
            toml::from_str(&toml).context("Failed to parse the config file")?;
        ValidatedConfig::try_from_toml(toml_config, regular_args)
    } else {
        ValidatedConfig::try_from_cmd_args(regular_args)
    }
    .map_err(|err| anyhow::anyhow!(err))?;

    let source = open_source(&config.source)?;

    let passed = if config.fips {
        run_fips(source.as_ref(), config.console_output)?
    } else {
        run_battery(&config, source)?
    };

    if passed {
        println!("Summary: all tests passed");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Summary: one or more tests failed / did not pass");
        Ok(ExitCode::FAILURE)
    }
}

/// Create the random source described by the config.
fn open_source(source: &SourceConfig) -> anyhow::Result<Box<dyn RandomSource>> {
    let source: Box<dyn RandomSource> = match source {
        SourceConfig::Os => {
            info!("Testing the operating system generator");
            Box::new(OsRandomSource)
        }
        SourceConfig::Seeded(seed) => {
            info!(seed, "Testing the seeded generator");
            Box::new(SeededSource::new(*seed))
        }
        SourceConfig::File { path, format } => {
            info!(path = %path.display(), ?format, "Reading input file");

            match format {
                InputFormat::Binary => Box::new(
                    ReaderSource::from_path(path).context("Failed to open input file")?,
                ),
                InputFormat::Ascii | InputFormat::AsciiLossy => {
                    let input =
                        fs::read_to_string(path).context("Failed to read input file")?;
                    let input = if *format == InputFormat::Ascii {
                        BitSequence::from_ascii_str(&input)
                            .context("Input file contains characters other than '0' or '1'")?
                    } else {
                        BitSequence::from_ascii_str_lossy(&input)
                    };

                    Box::new(ReaderSource::new(Cursor::new(input.to_bytes())))
                }
            }
        }
    };

    Ok(source)
}

/// Run the FIPS 140-2 tests on one block of the source.
///
/// Returns true if all tests passed, else false.
fn run_fips(source: &dyn RandomSource, console_output: bool) -> anyhow::Result<bool> {
    let bytes = source
        .generate(SEQUENCE_LENGTH / 8)
        .context("Failed to generate the FIPS 140-2 block")?;
    let result = fips_140_2_test(&BitSequence::from(bytes))?;

    if console_output {
        println!("{result}");
    }

    Ok(result.passed())
}

/// Run the selected tests with the orchestrator, print and save the reports. The sequences are
/// shared by all tests of the first pass.
///
/// Returns true if all calibrated tests passed, else false.
fn run_battery(config: &ValidatedConfig, source: Box<dyn RandomSource>) -> anyhow::Result<bool> {
    let selected_tests = select_tests(&config.tests_to_run, &config.test_config);
    if selected_tests.is_empty() {
        return Err(anyhow::anyhow!("No test can be run with this configuration"));
    }

    // Create CSV file, if necessary
    let mut csv_file = match &config.output_path {
        Some(path) => Some(CsvFile::new(path).context("Failed to create the output file")?),
        None => None,
    };

    println!(
        "Running the selected tests on {} sequences of {} bits: ",
        config.test_config.sequence_count, config.test_config.sequence_length
    );

    if config.console_output {
        print!("\t");
        selected_tests.iter().for_each(|test| print!("{test} "));
        println!();
        println!();
    }

    let orchestrator = TestOrchestrator::new(config.test_config, source)?;

    let begin = Instant::now();
    let reports = orchestrator.run_battery(&selected_tests)?;
    info!("Finished testing in {:.1}s", begin.elapsed().as_secs_f64());

    // if all tests passed
    let mut passed = true;

    for report in &reports {
        if let Some(csv_file) = &mut csv_file {
            csv_file.write_report(report)?;
        }

        if report.test().is_calibrated() && !report.passed() {
            passed = false;
        }

        if config.console_output {
            print_report(report);
        }
    }

    Ok(passed)
}

/// Print a test report, indented
fn print_report(report: &TestReport) {
    for line in report.to_string().lines() {
        println!("\t{line}");
    }
    println!();
}

/// Select the tests to run. Tests of the default battery are skipped if the configuration
/// doesn't suit them, explicitly requested tests are validated by the orchestrator.
fn select_tests(tests_to_run: &TestsToRun, config: &TestConfig) -> Vec<Test> {
    let applicable = |test: &Test| match config.validate_for_test(*test) {
        Ok(()) => true,
        Err(e) => {
            warn!(%test, "Skipping test: {e}");
            false
        }
    };

    match tests_to_run {
        TestsToRun::AllowList(tests) => tests.clone(),
        TestsToRun::BlockList(block_list) => Test::default_battery()
            .filter(|test| !block_list.contains(test))
            .filter(applicable)
            .collect(),
        TestsToRun::All => Test::default_battery().filter(applicable).collect(),
    }
}
