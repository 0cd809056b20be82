//! Runtime error types.

use satchel_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Core(#[from] satchel_core::Error),

    #[error("asset {asset} not found in bundle {bundle}")]
    AssetNotFound { bundle: String, asset: String },

    #[error("bundle already loaded: {0}")]
    DoubleLoad(String),

    #[error("failed to decode asset {asset} of bundle {bundle}: {source}")]
    Decode {
        bundle: String,
        asset: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RuntimeError {
    /// Whether the error means a bundle or asset does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            RuntimeError::Storage(e) => e.is_not_found(),
            RuntimeError::AssetNotFound { .. } => true,
            _ => false,
        }
    }
}

pub type RuntimeResult<T> = std::result::Result<T, RuntimeError>;
