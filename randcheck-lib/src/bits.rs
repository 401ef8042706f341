//! Everything needed to store the data to test.
//!
//! Bytes are unpacked most significant bit first: the byte `0b1000_0000` becomes the bit
//! sequence `1, 0, 0, 0, 0, 0, 0, 0`.

use crate::internals::count_ones;
use crate::{Error, BYTE_SIZE};
use rayon::prelude::*;

/// An ordered sequence of bits, stored unpacked (one `u8` of value 0 or 1 per bit) - used in
/// all tests.
///
/// Its length is always a multiple of 8, so that every sequence corresponds to a byte buffer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BitSequence {
    bits: Box<[u8]>,
}

impl BitSequence {
    /// Unpack a byte buffer, MSB first.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let bits = bytes
            .par_iter()
            .flat_map_iter(|&byte| (0..BYTE_SIZE).rev().map(move |shift| (byte >> shift) & 1))
            .collect::<Vec<u8>>()
            .into_boxed_slice();

        Self { bits }
    }

    /// Pack the sequence back into bytes, the inverse of [Self::from_bytes].
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bits
            .par_chunks_exact(BYTE_SIZE)
            .map(|chunk| chunk.iter().fold(0u8, |byte, &bit| (byte << 1) | bit))
            .collect()
    }

    /// Create a sequence from a list of bools. The length of the list must be a multiple of 8,
    /// else [Error::PreconditionViolation] is returned.
    pub fn from_bits(bits: &[bool]) -> Result<Self, Error> {
        check_byte_aligned(bits.len())?;

        Ok(Self {
            bits: bits.iter().map(|&bit| bit as u8).collect(),
        })
    }

    /// Parse a string of ASCII `'0'` and `'1'` characters. Any other character, or a number of
    /// bits that is not a multiple of 8, leads to [Error::PreconditionViolation].
    pub fn from_ascii_str(value: &str) -> Result<Self, Error> {
        let bits = value
            .bytes()
            .enumerate()
            .map(|(idx, char)| match char {
                b'0' => Ok(0),
                b'1' => Ok(1),
                _ => Err(Error::PreconditionViolation(format!(
                    "invalid character {:?} at index {idx}, expected '0' or '1'",
                    char as char
                ))),
            })
            .collect::<Result<Box<[u8]>, Error>>()?;

        check_byte_aligned(bits.len())?;

        Ok(Self { bits })
    }

    /// Parse a string of ASCII `'0'` and `'1'` characters, ignoring all other characters (e.g.
    /// whitespace). Trailing bits that do not fill a complete byte are dropped.
    pub fn from_ascii_str_lossy(value: &str) -> Self {
        let mut bits = value
            .bytes()
            .filter_map(|char| match char {
                b'0' => Some(0),
                b'1' => Some(1),
                _ => None,
            })
            .collect::<Vec<u8>>();

        bits.truncate(bits.len() - bits.len() % BYTE_SIZE);

        Self {
            bits: bits.into_boxed_slice(),
        }
    }

    /// How many bits the sequence contains
    pub fn len_bit(&self) -> usize {
        self.bits.len()
    }

    /// If the sequence contains no bits at all.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// The bit at the given index, `None` if out of bounds.
    pub fn bit(&self, idx: usize) -> Option<bool> {
        self.bits.get(idx).map(|&bit| bit == 1)
    }

    /// Iterate over all bits in order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = bool> + ExactSizeIterator + '_ {
        self.bits.iter().map(|&bit| bit == 1)
    }

    /// The raw bits, each element either 0 or 1.
    pub fn as_bits(&self) -> &[u8] {
        &self.bits
    }

    /// How many bits are set.
    pub fn count_ones(&self) -> usize {
        count_ones(&self.bits)
    }
}

impl From<Vec<u8>> for BitSequence {
    fn from(value: Vec<u8>) -> Self {
        Self::from_bytes(&value)
    }
}

impl<'a> From<&'a [u8]> for BitSequence {
    fn from(value: &'a [u8]) -> Self {
        Self::from_bytes(value)
    }
}

fn check_byte_aligned(len_bit: usize) -> Result<(), Error> {
    if len_bit % BYTE_SIZE != 0 {
        Err(Error::PreconditionViolation(format!(
            "bit length must be a multiple of {BYTE_SIZE}. Is: {len_bit}"
        )))
    } else {
        Ok(())
    }
}
