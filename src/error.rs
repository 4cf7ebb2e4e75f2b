use std::time::Duration;

use thiserror::Error;

/// Errors produced by the manual sorting core.
///
/// Most ordering anomalies (stale paths, ignored paths, name collisions) are
/// recovered where they happen and only show up in the log. The variants
/// exist so adapters and lower layers can report them precisely.
#[derive(Debug, Error)]
pub enum Error {
    /// The path is no longer present in the live tree
    #[error("path '{0}' no longer exists in the vault")]
    StaleReference(String),

    /// The destination path is already taken by another item
    #[error("destination '{0}' is already occupied")]
    NameCollision(String),

    /// The path is excluded from custom ordering
    #[error("path '{0}' is ignored")]
    IgnoredPath(String),

    /// The sync monitor stayed active for longer than the allowed wait
    #[error("timed out after {0:?} waiting for sync to become inactive")]
    SyncTimeout(Duration),

    /// The path is malformed or escapes the vault
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// No platform data directory could be determined
    #[error("could not determine data directory")]
    NoDataDir,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
