//! Tests of the multi-sequence analysis.

use super::assert_f64_eq;
use crate::analysis::{analyze, histogram, proportion_interval, uniformity_p_value, AnalysisParams};
use crate::{Error, Test};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_proportion_interval() {
    assert_eq!(proportion_interval(100, 0.01), 97..=100);
    assert_eq!(proportion_interval(1000, 0.01), 981..=999);
}

/// 1.0 lands in the last bin, values on a bin boundary in the upper bin.
#[test]
fn test_histogram() {
    let histogram = histogram(&[0.0, 0.05, 0.1, 0.95, 1.0], 10);

    assert_eq!(&*histogram, &[2, 1, 0, 0, 0, 0, 0, 0, 0, 2]);
}

#[test]
fn test_uniformity_p_value() {
    assert_f64_eq!(uniformity_p_value(&[10; 10]), 1.0);
    assert!(uniformity_p_value(&[0, 0, 0, 0, 0, 100, 0, 0, 0, 0]) < 1e-10);
}

/// Evenly spaced P-values are perfectly uniform, one of them lies below alpha.
#[test]
fn test_analyze_uniform_p_values() {
    let p_values = (0..100).map(|i| (i as f64 + 0.5) / 100.0).collect();

    let result = analyze(Test::Frequency, p_values, &AnalysisParams::default());
    assert!(result.is_ok());
    let result = result.unwrap();

    assert_eq!(result.sequence_count(), 100);
    assert_eq!(result.passing(), 99);
    assert_eq!(result.histogram(), &[10; 10]);
    assert_f64_eq!(result.uniformity_p_value(), 1.0);
    assert!(result.proportion_passed());
    assert!(result.uniformity_passed());
    assert!(result.passed());
}

/// All sequences pass, but the P-values are clustered: the uniformity check fails.
#[test]
fn test_analyze_clustered_p_values() {
    let result = analyze(Test::Runs, vec![0.5; 100], &AnalysisParams::default()).unwrap();

    assert!(result.proportion_passed());
    assert!(!result.uniformity_passed());
    assert!(!result.passed());
}

/// All sequences fail.
#[test]
fn test_analyze_failing_p_values() {
    let result = analyze(Test::Runs, vec![0.0; 100], &AnalysisParams::default()).unwrap();

    assert_eq!(result.passing(), 0);
    assert!(!result.proportion_passed());
    assert!(!result.passed());
}

#[test]
fn test_analyze_invalid_input() {
    let params = AnalysisParams::default();

    let result = analyze(Test::Frequency, Vec::new(), &params);
    assert!(matches!(result, Err(Error::PreconditionViolation(_))));

    let result = analyze(Test::Frequency, vec![0.5, 1.5], &params);
    assert!(matches!(result, Err(Error::PreconditionViolation(_))));

    let result = analyze(Test::Frequency, vec![0.5, f64::NAN], &params);
    assert!(matches!(result, Err(Error::PreconditionViolation(_))));

    let invalid_params = AnalysisParams {
        uniformity_bins: 1,
        ..Default::default()
    };
    let result = analyze(Test::Frequency, vec![0.5], &invalid_params);
    assert!(matches!(result, Err(Error::PreconditionViolation(_))));

    let invalid_params = AnalysisParams {
        significance_level: 1.0,
        ..Default::default()
    };
    let result = analyze(Test::Frequency, vec![0.5], &invalid_params);
    assert!(matches!(result, Err(Error::PreconditionViolation(_))));
}

/// Truly uniform P-values pass nearly always.
#[test]
fn test_analyze_random_p_values() {
    let mut rng = StdRng::seed_from_u64(422);
    let params = AnalysisParams::default();

    let passed = (0..50)
        .filter(|_| {
            let p_values = (0..100).map(|_| rng.random::<f64>()).collect();
            analyze(Test::Frequency, p_values, &params).unwrap().passed()
        })
        .count();

    assert!(passed >= 45, "only {passed} of 50 analyses passed");
}

#[test]
fn test_analysis_display() {
    let p_values = (0..100).map(|i| (i as f64 + 0.5) / 100.0).collect();
    let result = analyze(Test::Frequency, p_values, &AnalysisParams::default()).unwrap();

    let output = result.to_string();
    assert!(output.contains("99/100"));
    assert!(output.contains("PASS"));
}
