//! Error types for fest-player

use thiserror::Error;

/// Errors surfaced by player side effects (the controller itself absorbs them)
#[derive(Error, Debug)]
pub enum Error {
    /// Saving the audio asset for the visitor failed
    #[error("Download error: {0}")]
    Download(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using fest-player Error
pub type Result<T> = std::result::Result<T, Error>;

/// The platform refused a programmatic play request (autoplay policy)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Play request rejected: {reason}")]
pub struct PlayRejected {
    pub reason: String,
}

impl PlayRejected {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
