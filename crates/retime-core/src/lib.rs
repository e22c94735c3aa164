//! Retime Core - Foundation types for time-range composition
//!
//! This crate provides the fundamental types used throughout retime:
//! - Media time representation (MediaTime, RoundingMethod)
//! - Time ranges with half-open `[start, end)` semantics
//! - The shared error type

pub mod error;
pub mod time;

pub use error::{Error, Result};
pub use time::{MediaTime, RoundingMethod, TimeRange};

/// Timescales used when a source reports no timescale of its own.
pub mod timescale {
    /// Microseconds. Used when a container reports plain seconds.
    pub const MICROS: i32 = 1_000_000;
}
