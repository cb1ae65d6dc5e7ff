//! Error types for the engine.

use thiserror::Error;

/// Engine-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Curvature or generator parameters out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Malformed tile map bytes
    #[error("Corrupt data: {0}")]
    CorruptData(String),

    /// Value cannot be represented in the tile map format
    #[error("Encoding error: {0}")]
    Encoding(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
