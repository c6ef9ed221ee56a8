use std::io;
use thiserror::Error;

/// Result type for temp-archive operations
pub type Result<T> = std::result::Result<T, TempArchiveError>;

/// Unified error type for decoding and extraction
#[derive(Debug, Error)]
pub enum TempArchiveError {
    // Decode errors
    #[error("Archive ended before the 4-byte entry count could be read")]
    HeaderRead,

    #[error("Malformed entry at offset {offset}: {reason}")]
    MalformedEntry { offset: u64, reason: String },

    #[error("Truncated archive: needed {expected} bytes at offset {offset}, got {got}")]
    Truncated {
        offset: u64,
        expected: u64,
        got: u64,
    },

    // Extraction errors
    #[error("Failed to write to destination: {0}")]
    SinkWrite(#[source] io::Error),

    #[error("Cannot resolve destination for entry {name:?}: {reason}")]
    DestinationResolution { name: String, reason: String },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TempArchiveError {
    /// True for errors caused by bad archive content rather than a failure
    /// of the local environment.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            TempArchiveError::HeaderRead
                | TempArchiveError::MalformedEntry { .. }
                | TempArchiveError::Truncated { .. }
        )
    }
}
