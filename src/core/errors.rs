use std::path::PathBuf;

/// All domain errors for the log manager.
///
/// Nothing in the capture path surfaces these to the host request: the
/// storage router swallows them after a diagnostic. They only reach the
/// user through the CLI.
#[derive(Debug, thiserror::Error)]
pub enum LogManagerError {
    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error(
        "Log storage unavailable at {path}: {reason}\n\n  \
         Check that the directory exists and is writable, or switch\n  \
         [storage] backend to \"database\" in .log-manager/config.toml."
    )]
    StorageUnavailable { path: PathBuf, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Stored entry is malformed: {detail}")]
    MalformedRow { detail: String },

    #[error("Serialization failed: {detail}")]
    Serialization { detail: String },

    #[error("Invalid query: {detail}")]
    InvalidQuery { detail: String },

    #[error(
        "Replay failed: {detail}\n\n  \
         Expected a JSON array of requests, each with \"steps\"."
    )]
    ReplayError { detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LogManagerError>;
