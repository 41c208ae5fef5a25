//! Error types for parley

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for parley core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A transcript file exists but does not hold a valid conversation
    #[error("Malformed transcript {}: {reason}", path.display())]
    MalformedTranscript { path: PathBuf, reason: String },

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// A specialized Result type for parley core operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
