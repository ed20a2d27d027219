//! Error types for the storage layer.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors surfaced by storage backends.
///
/// Each variant carries the HTTP status the API layer should translate it
/// to; anything without a more specific mapping is a 500.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Unique constraint violated (duplicate username).
    #[error("username already exists")]
    Conflict,

    /// MongoDB driver failure.
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// BSON document could not be decoded into a domain type.
    #[error("document decode error: {0}")]
    Decode(#[from] mongodb::bson::de::Error),

    /// Domain type could not be encoded as a BSON document.
    #[error("document encode error: {0}")]
    Encode(#[from] mongodb::bson::ser::Error),

    /// Flat-file read/write failure.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Flat-file (de)serialization failure.
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RepositoryError {
    /// HTTP status hint for the API layer.
    pub fn status(&self) -> StatusCode {
        match self {
            RepositoryError::Conflict => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
