//! Sources of the bytes under test.
//!
//! The orchestrator only needs one capability: "produce N bytes, or fail". [RandomSource]
//! describes it, the implementations here cover the operating system generator, a seeded
//! reproducible generator and arbitrary readers (e.g. files with previously captured output).

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read};
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// The ways a source can fail to produce the requested bytes.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The operating system generator reported an error.
    #[error("Operating system random source failed: {0}")]
    Os(getrandom::Error),
    /// The source has no more data, e.g. the end of a file was reached.
    #[error("Random source exhausted: requested {requested} bytes, got {available}")]
    Exhausted { requested: usize, available: usize },
    /// Reading from the source failed.
    #[error("Failed to read random data: {0}")]
    Io(#[from] io::Error),
}

/// A source of bytes. Sources are shared between the workers of the orchestrator, so each
/// call to [generate](Self::generate) has to hand out fresh data.
pub trait RandomSource: Send + Sync {
    /// Produce exactly `len` bytes.
    fn generate(&self, len: usize) -> Result<Vec<u8>, GenerationError>;
}

impl<T: RandomSource + ?Sized> RandomSource for Box<T> {
    fn generate(&self, len: usize) -> Result<Vec<u8>, GenerationError> {
        (**self).generate(len)
    }
}

impl<T: RandomSource + ?Sized> RandomSource for &T {
    fn generate(&self, len: usize) -> Result<Vec<u8>, GenerationError> {
        (**self).generate(len)
    }
}

/// The cryptographically secure generator of the operating system.
#[derive(Copy, Clone, Debug, Default)]
pub struct OsRandomSource;

impl RandomSource for OsRandomSource {
    fn generate(&self, len: usize) -> Result<Vec<u8>, GenerationError> {
        let mut buffer = vec![0; len];
        getrandom::fill(&mut buffer).map_err(GenerationError::Os)?;
        Ok(buffer)
    }
}

/// A reproducible generator, seeded with a fixed value.
///
/// Calls are serialized: with several workers, the assignment of output chunks to sequences
/// depends on scheduling, but the set of generated chunks does not.
#[derive(Debug)]
pub struct SeededSource {
    rng: Mutex<StdRng>,
}

impl SeededSource {
    /// A new generator with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededSource {
    fn generate(&self, len: usize) -> Result<Vec<u8>, GenerationError> {
        let mut buffer = vec![0; len];
        // the generator state is valid after any panic, a poisoned lock can be used further
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fill_bytes(&mut buffer);
        Ok(buffer)
    }
}

/// Bytes read from any [Read] implementation, in order. Each call consumes the next `len`
/// bytes. If the reader ends before, [GenerationError::Exhausted] is returned.
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: Mutex<R>,
}

impl<R: Read + Send> ReaderSource<R> {
    /// Wrap a reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader: Mutex::new(reader),
        }
    }
}

impl ReaderSource<BufReader<File>> {
    /// Read binary data from the file at the given path.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        File::open(path).map(BufReader::new).map(Self::new)
    }
}

impl<R: Read + Send> RandomSource for ReaderSource<R> {
    fn generate(&self, len: usize) -> Result<Vec<u8>, GenerationError> {
        let mut reader = self.reader.lock().unwrap_or_else(PoisonError::into_inner);
        let mut buffer = vec![0; len];
        let mut filled = 0;

        while filled < len {
            match reader.read(&mut buffer[filled..]) {
                Ok(0) => {
                    return Err(GenerationError::Exhausted {
                        requested: len,
                        available: filled,
                    })
                }
                Ok(count) => filled += count,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(buffer)
    }
}
