//! Storage trait definitions.

use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;

/// Flat key/value object store holding source content and built bundles.
///
/// Keys are `/`-separated relative paths. Listing treats a prefix as a
/// directory: `list("variant")` and `list("variant/")` are equivalent and
/// `list("")` lists everything.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Check if an object exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Get an object's content.
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Put an object atomically, replacing any previous content.
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()>;

    /// Delete an object.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// List object keys under a directory prefix, sorted.
    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Copy an object.
    async fn copy(&self, from: &str, to: &str) -> StorageResult<()>;

    /// Get the name of this storage backend.
    ///
    /// Returns a static string identifier for the backend type (e.g., "memory", "filesystem").
    /// Used for logging.
    fn backend_name(&self) -> &'static str;

    /// Move an object to a new key.
    ///
    /// The default implementation copies then deletes the source.
    async fn rename(&self, from: &str, to: &str) -> StorageResult<()> {
        self.copy(from, to).await?;
        self.delete(from).await
    }

    /// Delete every object under a directory prefix. Returns the number removed.
    async fn delete_prefix(&self, prefix: &str) -> StorageResult<usize> {
        let keys = self.list(prefix).await?;
        let mut removed = 0;
        for key in keys {
            match self.delete(&key).await {
                Ok(()) => removed += 1,
                Err(StorageError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(removed)
    }

    /// Verify storage backend connectivity.
    ///
    /// The default implementation returns Ok(()), suitable for backends that
    /// don't require connectivity verification.
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}

/// Normalize a listing prefix to directory form (`""` or `"dir/"`).
pub fn directory_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}
