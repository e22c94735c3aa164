//! Integration test crate for retime.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on multiple retime crates to verify they work together.

#[cfg(test)]
mod strategies;

#[cfg(test)]
mod probe_to_timeline;
