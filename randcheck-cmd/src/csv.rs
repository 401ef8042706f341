//! Everything needed to save CSV results.

use core::error::Error;
use csv::WriterBuilder;
use randcheck_lib::orchestrator::TestReport;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::path::Path;

/// Error type for [CsvFile]
#[derive(Debug)]
pub enum CsvFileError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl Display for CsvFileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CsvFileError::Io(e) => write!(f, "IO error: {e}"),
            CsvFileError::Csv(e) => write!(f, "CSV error: {e}"),
        }
    }
}

impl Error for CsvFileError {}

impl From<std::io::Error> for CsvFileError {
    fn from(value: std::io::Error) -> Self {
        CsvFileError::Io(value)
    }
}

impl From<csv::Error> for CsvFileError {
    fn from(value: csv::Error) -> Self {
        CsvFileError::Csv(value)
    }
}

/// One row of the CSV file
#[derive(Serialize)]
struct CsvFormat<'a> {
    #[serde(rename = "test")]
    test: &'a str,
    #[serde(rename = "sequences")]
    sequences: usize,
    #[serde(rename = "passing")]
    passing: usize,
    #[serde(rename = "expected passing")]
    expected_passing: &'a str,
    #[serde(rename = "uniformity p-value")]
    uniformity_p_value: f64,
    #[serde(rename = "PASS/FAIL")]
    pass_fail: &'static str,
    #[serde(rename = "retried")]
    retried: bool,
}

/// This struct represents a CSV file to write the test reports.
#[derive(Debug)]
pub struct CsvFile(csv::Writer<File>);

impl CsvFile {
    /// Create a new CSV File writer writing to the specified path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, CsvFileError> {
        let mut builder = WriterBuilder::new();

        builder.delimiter(b';').has_headers(true);

        // target specific: on windows, lines should end with CRLF, on all other platforms, the default
        // LF is enough.
        #[cfg(target_family = "windows")]
        {
            use csv::Terminator;

            builder.terminator(Terminator::CRLF);
        }

        Ok(Self(builder.from_path(path)?))
    }

    /// Append the given report to the CSV file. The columns describe the decisive run, i.e. the
    /// retry if there was one.
    pub fn write_report(&mut self, report: &TestReport) -> Result<(), CsvFileError> {
        let test = report.test().to_string();
        let result = report.decisive();
        let expected = result.expected_passing();
        let expected_passing = format!("{}..={}", expected.start(), expected.end());

        let row = CsvFormat {
            test: &test,
            sequences: result.sequence_count(),
            passing: result.passing(),
            expected_passing: &expected_passing,
            uniformity_p_value: result.uniformity_p_value(),
            pass_fail: if report.passed() { "PASS" } else { "FAIL" },
            retried: report.retry().is_some(),
        };

        self.0.serialize(row)?;
        self.0.flush()?;
        Ok(())
    }
}
