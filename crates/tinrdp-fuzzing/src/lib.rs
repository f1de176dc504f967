//! Fuzzing support for TinRDP: test case generators and oracles.

pub mod generators;
pub mod oracles;
