//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid source path: {0}")]
    InvalidSourcePath(String),

    #[error("invalid bundle name: {0}")]
    InvalidBundleName(String),

    #[error("archive integrity error: {0}")]
    ArchiveIntegrity(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
