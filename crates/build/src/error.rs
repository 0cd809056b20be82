//! Build pipeline error types.

use satchel_storage::StorageError;
use thiserror::Error;

/// Build pipeline errors.
///
/// Every variant aborts the stage that raised it; no map is emitted for a
/// failed build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{path} is a primary asset of both {first_group} and {second_group}")]
    DuplicatePrimaryAsset {
        path: String,
        first_group: String,
        second_group: String,
    },

    #[error("group registered twice: {0}")]
    DuplicateGroup(String),

    #[error("shared group key for {path} (owners: {owners}) is empty or invalid")]
    InvalidSharedKey { path: String, owners: String },

    #[error("dependency source failed for {path}: {message}")]
    Dependency { path: String, message: String },

    #[error("archiver failed: {0}")]
    Archive(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Core(#[from] satchel_core::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for build operations.
pub type BuildResult<T> = std::result::Result<T, BuildError>;
