use std::path::PathBuf;

use thiserror::Error;

/// Failure that makes a whole export file unusable.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} is not a JSON array of conversations")]
    NotAnArray { path: PathBuf },

    #[error("{path} is too large ({size} bytes, max {max} bytes)")]
    TooLarge { path: PathBuf, size: u64, max: u64 },

    /// No element matched either provider signature
    #[error("no conversations found / unsupported format in {path}")]
    UnsupportedFormat { path: PathBuf },
}

/// Failure that skips one conversation; never escalates past the orchestrator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversationError {
    #[error("conversation has no id")]
    MissingId,

    #[error("malformed conversation tree: {0}")]
    MalformedTree(String),

    #[error("unexpected shape: {0}")]
    InvalidShape(String),
}
