//! Runs tests over many independently generated sequences and aggregates the results.
//!
//! For each test, [TestConfig::sequence_count] sequences of [TestConfig::sequence_length] bits
//! are requested from the [RandomSource], tested, and the P-values are
//! [analysed](crate::analysis::analyze). If the analysis fails and
//! [TestConfig::retry_on_failure] is set, the test is repeated once with fresh sequences: a
//! test that fails twice points to a systematic bias rather than statistical variance.
//!
//! The work is spread over a worker pool owned by the orchestrator. The P-values are collected
//! in trial order.

use crate::analysis::{analyze, MultiSequenceResult};
use crate::bits::BitSequence;
use crate::config::TestConfig;
use crate::source::{GenerationError, RandomSource};
use crate::test_runner::run_test;
use crate::{Error, Test};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fmt;
use tracing::{debug, info, warn};

/// The outcome of one test: the first run and, if it failed and retries are enabled, the
/// second run.
#[derive(Clone, Debug, PartialEq)]
pub struct TestReport {
    sequence_length: usize,
    first: MultiSequenceResult,
    retry: Option<MultiSequenceResult>,
}

impl TestReport {
    /// The reported test
    pub fn test(&self) -> Test {
        self.first.test()
    }

    /// Length of each tested sequence, in bits.
    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    /// The result of the first run.
    pub fn first(&self) -> &MultiSequenceResult {
        &self.first
    }

    /// The result of the retry, if one happened.
    pub fn retry(&self) -> Option<&MultiSequenceResult> {
        self.retry.as_ref()
    }

    /// The result that decides the verdict: the retry if there was one, else the first run.
    pub fn decisive(&self) -> &MultiSequenceResult {
        self.retry.as_ref().unwrap_or(&self.first)
    }

    /// Overall verdict
    pub fn passed(&self) -> bool {
        self.decisive().passed()
    }
}

impl fmt::Display for TestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} sequences of {} bits",
            self.test(),
            self.first.sequence_count(),
            self.sequence_length
        )?;
        if !self.test().is_calibrated() {
            writeln!(f, "  note: uncalibrated test, the verdict is informational")?;
        }
        writeln!(f, "{}", self.first)?;
        if let Some(retry) = &self.retry {
            writeln!(f, "  retry with fresh sequences:")?;
            writeln!(f, "{retry}")?;
        }
        write!(
            f,
            "  verdict: {}",
            if self.passed() { "PASSED" } else { "FAILED" }
        )
    }
}

/// Drives the tests, see the [module docs](crate::orchestrator).
pub struct TestOrchestrator<S> {
    config: TestConfig,
    source: S,
    pool: ThreadPool,
}

impl<S: RandomSource> TestOrchestrator<S> {
    /// Creates a new orchestrator. The configuration is [validated](TestConfig::validate), and
    /// the worker pool is built.
    pub fn new(config: TestConfig, source: S) -> Result<Self, Error> {
        config.validate()?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(config.thread_count())
            .thread_name(|idx| format!("randcheck-worker-{idx}"))
            .build()?;

        debug!(threads = pool.current_num_threads(), "worker pool ready");

        Ok(Self {
            config,
            source,
            pool,
        })
    }

    /// The used configuration
    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    /// Runs a single test over [TestConfig::sequence_count] fresh sequences.
    pub fn run(&self, test: Test) -> Result<TestReport, Error> {
        self.config.validate_for_test(test)?;
        warn_if_uncalibrated(test);

        let first = self.run_pass(test)?;
        let retry = self.retry_if_failed(&first)?;

        Ok(self.report(first, retry))
    }

    /// Runs several tests. Each generated sequence is shared by all tests of the first pass;
    /// failed tests are retried individually with fresh sequences.
    ///
    /// All tests are validated before any sequence is generated.
    pub fn run_battery(&self, tests: &[Test]) -> Result<Vec<TestReport>, Error> {
        tests
            .iter()
            .try_for_each(|&test| self.config.validate_for_test(test))?;
        tests.iter().copied().for_each(warn_if_uncalibrated);

        info!(
            tests = tests.len(),
            sequences = self.config.sequence_count.get(),
            sequence_length = self.config.sequence_length.get(),
            "starting battery"
        );

        // one row of P-values per trial, one column per test
        let trials = self.pool.install(|| {
            (0..self.config.sequence_count.get())
                .into_par_iter()
                .map(|_| {
                    let data = self.generate_sequence()?;
                    tests
                        .iter()
                        .map(|&test| run_test(test, &data, &self.config.test_args))
                        .map(|result| result.map(|result| result.p_value()))
                        .collect::<Result<Vec<f64>, Error>>()
                })
                .collect::<Result<Vec<_>, Error>>()
        })?;

        tests
            .iter()
            .enumerate()
            .map(|(column, &test)| {
                let p_values = trials.iter().map(|row| row[column]).collect();
                let first = self.analyze(test, p_values)?;
                let retry = self.retry_if_failed(&first)?;

                Ok(self.report(first, retry))
            })
            .collect()
    }

    /// One pass of a test over fresh sequences.
    fn run_pass(&self, test: Test) -> Result<MultiSequenceResult, Error> {
        let p_values = self.pool.install(|| {
            (0..self.config.sequence_count.get())
                .into_par_iter()
                .map(|_| {
                    let data = self.generate_sequence()?;
                    run_test(test, &data, &self.config.test_args).map(|result| result.p_value())
                })
                .collect::<Result<Vec<f64>, Error>>()
        })?;

        self.analyze(test, p_values)
    }

    fn retry_if_failed(
        &self,
        first: &MultiSequenceResult,
    ) -> Result<Option<MultiSequenceResult>, Error> {
        if first.passed() || !self.config.retry_on_failure {
            return Ok(None);
        }

        warn!(
            test = %first.test(),
            passing = first.passing(),
            uniformity_p_value = first.uniformity_p_value(),
            "test failed, retrying with fresh sequences"
        );

        self.run_pass(first.test()).map(Some)
    }

    fn analyze(&self, test: Test, p_values: Vec<f64>) -> Result<MultiSequenceResult, Error> {
        let result = analyze(test, p_values, &self.config.analysis_params())?;

        debug!(
            test = %test,
            passing = result.passing(),
            uniformity_p_value = result.uniformity_p_value(),
            passed = result.passed(),
            "analysis finished"
        );

        Ok(result)
    }

    fn report(&self, first: MultiSequenceResult, retry: Option<MultiSequenceResult>) -> TestReport {
        let report = TestReport {
            sequence_length: self.config.sequence_length.get(),
            first,
            retry,
        };

        info!(test = %report.test(), passed = report.passed(), "test finished");
        report
    }

    /// Requests one sequence from the source. A source returning fewer bytes than requested is
    /// treated as exhausted.
    fn generate_sequence(&self) -> Result<BitSequence, Error> {
        let requested = self.config.sequence_bytes();
        let bytes = self.source.generate(requested)?;

        if bytes.len() != requested {
            return Err(GenerationError::Exhausted {
                requested,
                available: bytes.len(),
            }
            .into());
        }

        Ok(BitSequence::from(bytes))
    }
}

fn warn_if_uncalibrated(test: Test) {
    if !test.is_calibrated() {
        warn!(test = %test, "P-values of this test are uncalibrated, the verdict is informational");
    }
}
