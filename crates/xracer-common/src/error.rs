//! Error types shared across XRacer crates.

use thiserror::Error;

/// Top-level error type for loading and parsing XRacer data.
#[derive(Debug, Error)]
pub enum XRacerError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A data file could not be parsed
    #[error("Failed to parse {format} data: {message}")]
    Parse {
        /// Format that was being parsed (toml, ron)
        format: &'static str,
        /// Parser message
        message: String,
    },

    /// A data file has an extension we do not know how to read
    #[error("Unsupported data format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for XRacer loading operations.
pub type XRacerResult<T> = Result<T, XRacerError>;
