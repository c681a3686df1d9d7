//! Error types for the digital asset archive.

use thiserror::Error;

/// Result type alias using the archive's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for archive operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Archive record not found, or hidden from the viewer
    #[error("Archive not found: {0}")]
    ArchiveNotFound(uuid::Uuid),

    /// Viewer may know the resource exists but may not enter it
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Authentication failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
