//! All unit tests

use crate::bits::BitSequence;
use crate::Error;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

mod analysis;
mod battery;

/// Macro to compare f64 values - == is not a good option because of floating point shenanigans.
/// The optional third argument is the allowed absolute deviation, the default is f64::EPSILON.
macro_rules! assert_f64_eq {
    ($left:expr, $right:expr) => {
        assert_f64_eq!($left, $right, f64::EPSILON);
    };
    ($left:expr, $right:expr, $tolerance:expr) => {
        let (got, expected, tolerance): (f64, f64, f64) = ($left, $right, $tolerance);
        assert!(
            f64::abs(got - expected) < tolerance,
            "Expected {expected}, got {got} (tolerance {tolerance})"
        );
    };
}

use assert_f64_eq;

/// Check the test result: Assert that it is OK and print the error if it is not.
fn result_checker<T>(output: &Result<T, Error>) {
    if let Err(e) = output {
        println!("Error: {e}")
    }
    assert!(output.is_ok())
}

/// Reproducible pseudo random bytes.
fn seeded_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut buffer = vec![0; len];
    rng.fill_bytes(&mut buffer);
    buffer
}

/// Bits are unpacked with the most significant bit first.
#[test]
fn test_bit_sequence_from_bytes() {
    let sequence = BitSequence::from_bytes(&[0b1011_0001, 0b0100_0000]);

    assert_eq!(sequence.len_bit(), 16);
    assert_eq!(
        sequence.as_bits(),
        &[1, 0, 1, 1, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 0, 0]
    );
    assert_eq!(sequence.count_ones(), 5);
    assert_eq!(sequence.bit(0), Some(true));
    assert_eq!(sequence.bit(1), Some(false));
    assert_eq!(sequence.bit(16), None);
}

/// Test the creation of a sequence from a bool slice
#[test]
fn test_bit_sequence_from_bools() {
    let input_data = [true, false, true, true, false, true, false, true];

    let sequence = BitSequence::from_bits(&input_data);
    result_checker(&sequence);
    let sequence = sequence.unwrap();

    assert_eq!(sequence.to_bytes(), vec![0b1011_0101]);
    assert!(sequence.iter().eq(input_data.iter().copied()));

    // 10 bits do not fill complete bytes
    let sequence = BitSequence::from_bits(&[true; 10]);
    assert!(matches!(sequence, Err(Error::PreconditionViolation(_))));
}

/// Test the creation of a sequence from an ASCII string
#[test]
fn test_bit_sequence_from_ascii_string() {
    let sequence = BitSequence::from_ascii_str("1011010100000001");
    result_checker(&sequence);

    assert_eq!(sequence.unwrap().to_bytes(), vec![0b1011_0101, 0b0000_0001]);
}

/// Test the ASCII string parsing with invalid strings (should not work)
#[test]
fn test_bit_sequence_from_ascii_string_invalid() {
    // invalid character
    let sequence = BitSequence::from_ascii_str("10110b10");
    assert!(matches!(sequence, Err(Error::PreconditionViolation(_))));

    // not a multiple of 8
    let sequence = BitSequence::from_ascii_str("1011010101");
    assert!(matches!(sequence, Err(Error::PreconditionViolation(_))));
}

/// Test the lossy ASCII string parsing with invalid characters interspersed.
#[test]
fn test_bit_sequence_from_ascii_string_lossy() {
    let sequence = BitSequence::from_ascii_str_lossy("1011 0101\n0000 x0001\r\n11");

    // the trailing "11" does not fill a byte
    assert_eq!(sequence.len_bit(), 16);
    assert_eq!(sequence.to_bytes(), vec![0b1011_0101, 0b0000_0001]);

    assert!(BitSequence::from_ascii_str_lossy("abc").is_empty());
}

/// Reverse iteration is used by the backward cumulative sums.
#[test]
fn test_bit_sequence_reverse_iteration() {
    let sequence = BitSequence::from(vec![0b1000_0011_u8]);

    let reversed = sequence.iter().rev().collect::<Vec<_>>();
    assert_eq!(
        reversed,
        vec![true, true, false, false, false, false, false, true]
    );
    assert_eq!(sequence.iter().len(), 8);
}

#[test]
fn test_bit_sequence_from_seeded_bytes() {
    let bytes = seeded_bytes(42, 1024);
    let sequence = BitSequence::from(bytes.as_slice());

    assert_eq!(sequence.len_bit(), 8192);
    assert_eq!(sequence.to_bytes(), bytes);
    assert_eq!(
        sequence.count_ones(),
        bytes.iter().map(|byte| byte.count_ones() as usize).sum::<usize>()
    );
}

proptest! {
    #[test]
    fn bytes_survive_unpacking(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let sequence = BitSequence::from_bytes(&bytes);

        prop_assert_eq!(sequence.len_bit(), bytes.len() * 8);
        prop_assert_eq!(sequence.to_bytes(), bytes);
    }

    #[test]
    fn ascii_parsing_matches_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let ascii = bytes.iter().map(|byte| format!("{byte:08b}")).collect::<String>();

        let sequence = BitSequence::from_ascii_str(&ascii);
        prop_assert!(sequence.is_ok());
        prop_assert_eq!(sequence.unwrap(), BitSequence::from_bytes(&bytes));
    }
}
