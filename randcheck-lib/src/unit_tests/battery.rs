//! Runs the whole battery on pseudo random input, plus the FIPS 140-2 tests.

use super::{result_checker, seeded_bytes};
use crate::bits::BitSequence;
use crate::test_runner::{check_preconditions, run_test, run_tests};
use crate::tests::fips_140_2::{fips_140_2_test, SEQUENCE_LENGTH};
use crate::tests::frequency_block::{frequency_block_test, FrequencyBlockTestArg};
use crate::tests::serial::SerialTestArg;
use crate::{Error, IntoEnumIterator, Test, TestArgs};
use proptest::prelude::*;
use std::num::NonZero;

const LEVEL_VALUE: f64 = 0.01;

/// Every test accepts a sequence of 10^6 bits with the default arguments, and nearly all pass
/// on pseudo random input.
#[test]
fn test_all_tests_on_random_input() {
    let input = BitSequence::from(seeded_bytes(1, 1_000_000 / 8));
    let args = TestArgs::default();

    let tests = Test::iter().collect::<Vec<_>>();
    let results = run_tests(&tests, &input, &args);

    assert_eq!(results.len(), 11);
    let mut passed = 0;
    for ((test, result), expected_test) in results.into_iter().zip(&tests) {
        assert_eq!(test, *expected_test);
        result_checker(&result);

        let result = result.unwrap();
        assert!(
            (0.0..=1.0).contains(&result.p_value()),
            "{test}: P-value {} out of range",
            result.p_value()
        );
        if result.passed(LEVEL_VALUE) {
            passed += 1;
        }
    }

    assert!(passed >= 9, "only {passed} of 11 tests passed");
}

/// Constant sequences of 10^6 bits are accepted by every test, the P-values stay within [0, 1].
#[test]
fn test_all_tests_on_constant_input() {
    let args = TestArgs::default();
    let tests = Test::iter().collect::<Vec<_>>();

    for byte in [0x00, 0xFF] {
        let input = BitSequence::from(vec![byte; 1_000_000 / 8]);
        let results = run_tests(&tests, &input, &args);

        assert_eq!(results.len(), 11);
        for (test, result) in results {
            result_checker(&result);

            let p_value = result.unwrap().p_value();
            assert!(
                (0.0..=1.0).contains(&p_value),
                "{test} on {byte:#04x}: P-value {p_value} out of range"
            );
        }
    }
}

/// The block frequency test passes on nearly all pseudo random sequences.
#[test]
fn test_frequency_block_on_random_input() {
    let arg = FrequencyBlockTestArg::new(NonZero::new(128).unwrap());

    let passed = (0..10)
        .filter(|&seed| {
            let input = BitSequence::from(seeded_bytes(100 + seed, 1_000_000 / 8));
            frequency_block_test(&input, arg).unwrap().passed(LEVEL_VALUE)
        })
        .count();

    assert!(passed >= 8, "only {passed} of 10 sequences passed");
}

#[test]
fn test_check_preconditions() {
    let args = TestArgs::default();

    for test in Test::iter() {
        let result = check_preconditions(test, 1_000_000, &args);
        result_checker(&result);
    }

    let result = check_preconditions(Test::BinaryMatrixRank, 1000, &args);
    assert!(matches!(result, Err(Error::PreconditionViolation(_))));

    let result = check_preconditions(Test::Frequency, 0, &args);
    assert!(matches!(result, Err(Error::PreconditionViolation(_))));

    let result = run_test(Test::LinearComplexity, &BitSequence::from(vec![0xAA; 8]), &args);
    assert!(matches!(result, Err(Error::PreconditionViolation(_))));
}

/// The serial test reports the smaller of its two P-values.
#[test]
fn test_serial_reports_minimum() {
    let input = BitSequence::from(seeded_bytes(11, 1 << 14));
    let args = TestArgs {
        serial: SerialTestArg::new(5).unwrap(),
        ..Default::default()
    };

    let [p_value_1, p_value_2] =
        crate::tests::serial::serial_test(&input, args.serial).unwrap();
    let reported = run_test(Test::Serial, &input, &args).unwrap();

    assert_eq!(
        reported.p_value(),
        f64::min(p_value_1.p_value(), p_value_2.p_value())
    );
}

#[test]
fn test_default_battery() {
    let battery = Test::default_battery().collect::<Vec<_>>();

    assert_eq!(battery.len(), 10);
    assert!(!battery.contains(&Test::LinearComplexity));
    assert!(!Test::LinearComplexity.is_calibrated());
}

#[test]
fn test_fips_140_2_random_input() {
    let input = BitSequence::from(seeded_bytes(140, SEQUENCE_LENGTH / 8));

    let output = fips_140_2_test(&input);
    result_checker(&output);

    let output = output.unwrap();
    assert!(output.passed(), "{output}");
}

#[test]
fn test_fips_140_2_constant_input() {
    let input = BitSequence::from(vec![0; SEQUENCE_LENGTH / 8]);

    let output = fips_140_2_test(&input);
    result_checker(&output);

    let output = output.unwrap();
    assert_eq!(output.ones(), 0);
    assert_eq!(output.longest_run(), SEQUENCE_LENGTH);
    assert!(!output.monobit_passed());
    assert!(!output.long_run_passed());
    assert!(!output.passed());
}

/// 0xAA repeated: perfectly balanced, but only runs of length 1.
#[test]
fn test_fips_140_2_alternating_input() {
    let input = BitSequence::from(vec![0xAA; SEQUENCE_LENGTH / 8]);

    let output = fips_140_2_test(&input).unwrap();

    assert!(output.monobit_passed());
    assert!(output.long_run_passed());
    assert!(!output.poker_passed());
    assert!(!output.runs_passed());
    assert_eq!(output.run_counts()[0][0], 10_000);
    assert_eq!(output.run_counts()[1][0], 10_000);
}

#[test]
fn test_fips_140_2_wrong_length() {
    let input = BitSequence::from(vec![0xAA; 100]);

    let output = fips_140_2_test(&input);
    assert!(matches!(output, Err(Error::PreconditionViolation(_))));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// P-values of valid inputs always lie within [0, 1], even for degenerate sequences.
    #[test]
    fn p_values_are_in_range(bytes in proptest::collection::vec(any::<u8>(), 16..512)) {
        let input = BitSequence::from(bytes);
        let args = TestArgs {
            serial: SerialTestArg::new(3).unwrap(),
            ..Default::default()
        };

        for test in [
            Test::Frequency,
            Test::FrequencyWithinABlock,
            Test::Runs,
            Test::LongestRunOfOnes,
            Test::SpectralDft,
            Test::Serial,
            Test::CumulativeSums,
        ] {
            let result = run_test(test, &input, &args);
            prop_assert!(result.is_ok());
            let p_value = result.unwrap().p_value();
            prop_assert!((0.0..=1.0).contains(&p_value), "{}: {}", test, p_value);
        }
    }
}
