//! All statistical test implementations: the NIST SP 800-22 tests, each as a function from a
//! [BitSequence](crate::bits::BitSequence) to a [TestResult](crate::TestResult), and the FIPS 140-2
//! power-up battery.


pub use serial_and_approximate_entropy::{approximate_entropy, serial};
