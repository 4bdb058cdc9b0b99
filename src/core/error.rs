//! Error types for the analysis engine

use thiserror::Error;

/// Library-wide error type
///
/// Insufficient data is deliberately not represented here: period
/// aggregation returns an empty list and figure-data functions return
/// `None` when a request cannot be satisfied, so callers skip that output
/// instead of handling a failure.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;
