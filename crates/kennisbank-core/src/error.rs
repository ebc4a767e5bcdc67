//! Error types for Kennisbank.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the caller may retry the same request unchanged.
    /// Only upstream provider failures qualify; nothing was persisted.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Upstream(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
