//! Ingestion error types

use thiserror::Error;

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestionError {
    /// A track row could not be parsed
    #[error("failed to parse track row {line}: {message}")]
    ParseFailed {
        /// 1-based line number
        line: usize,
        /// Error message
        message: String,
    },

    /// The track holds no position rows
    #[error("track {path} contains no positions")]
    EmptyTrack {
        /// Track file path
        path: String,
    },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Ingestion Result alias
pub type Result<T> = std::result::Result<T, IngestionError>;
