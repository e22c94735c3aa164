//! Error types for retime.

use thiserror::Error;

/// Main error type for retime operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid timescale: {0} (must be in 1..=1000000000)")]
    InvalidTimescale(i64),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    #[error("Timeline error: {0}")]
    Timeline(String),

    #[error("Build cancelled")]
    Cancelled,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Media error: {0}")]
    Media(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for retime operations.
pub type Result<T> = std::result::Result<T, Error>;
