//! Errors surfaced to the console loop

use parley_providers::ProviderError;
use std::path::PathBuf;
use thiserror::Error;

/// Every error a chat session can report. None of them end the session;
/// the console prints the message and keeps reading input.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Bad command usage, e.g. `/load` without a filename
    #[error("{0}")]
    Usage(String),

    /// Conversation file does not exist
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Conversation file exists but could not be parsed
    #[error("Could not read conversation from {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    /// The completion service failed
    #[error("{0}")]
    Service(#[from] ProviderError),

    /// Reading or writing transcripts failed
    #[error("{0}")]
    Storage(parley_core::Error),
}

pub type ChatResult<T> = Result<T, ChatError>;

impl From<parley_core::Error> for ChatError {
    fn from(e: parley_core::Error) -> Self {
        match e {
            parley_core::Error::NotFound(path) => ChatError::NotFound(path),
            parley_core::Error::MalformedTranscript { path, reason } => {
                ChatError::Malformed { path, reason }
            }
            other => ChatError::Storage(other),
        }
    }
}
