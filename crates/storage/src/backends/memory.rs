//! In-memory storage backend.

use crate::error::{StorageError, StorageResult};
use crate::traits::{ObjectStore, directory_prefix};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::instrument;

/// Object store kept entirely in process memory.
///
/// Used for dry-run builds and tests. Cloning the returned bytes is cheap, so
/// readers never hold the lock while using an object.
#[derive(Default)]
pub struct MemoryBackend {
    objects: RwLock<BTreeMap<String, Bytes>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend pre-populated with objects.
    pub fn with_objects<I, K, V>(objects: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Bytes>,
    {
        let objects = objects
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            objects: RwLock::new(objects),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Bytes>> {
        self.objects.read().unwrap_or_else(|poisoned| {
            tracing::warn!("memory backend lock was poisoned, recovering with into_inner()");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Bytes>> {
        self.objects.write().unwrap_or_else(|poisoned| {
            tracing::warn!("memory backend lock was poisoned, recovering with into_inner()");
            poisoned.into_inner()
        })
    }

    fn validate_key(key: &str) -> StorageResult<()> {
        if key.is_empty()
            || key.starts_with('/')
            || key.ends_with('/')
            || key.split('/').any(|part| part.is_empty() || part == "." || part == "..")
        {
            return Err(StorageError::InvalidKey(format!("invalid object key: {key:?}")));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryBackend {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Self::validate_key(key)?;
        Ok(self.read().contains_key(key))
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        Self::validate_key(key)?;
        self.read()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    #[instrument(skip(self, data), fields(backend = "memory", size = data.len()))]
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        Self::validate_key(key)?;
        self.write().insert(key.to_string(), data);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        Self::validate_key(key)?;
        self.write()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let prefix = directory_prefix(prefix);
        Ok(self
            .read()
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }

    async fn copy(&self, from: &str, to: &str) -> StorageResult<()> {
        Self::validate_key(from)?;
        Self::validate_key(to)?;
        let mut objects = self.write();
        let data = objects
            .get(from)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(from.to_string()))?;
        objects.insert(to.to_string(), data);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn rename(&self, from: &str, to: &str) -> StorageResult<()> {
        Self::validate_key(from)?;
        Self::validate_key(to)?;
        let mut objects = self.write();
        let data = objects
            .remove(from)
            .ok_or_else(|| StorageError::NotFound(from.to_string()))?;
        objects.insert(to.to_string(), data);
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> StorageResult<usize> {
        let prefix = directory_prefix(prefix);
        let mut objects = self.write();
        let before = objects.len();
        objects.retain(|k, _| !k.starts_with(&prefix));
        Ok(before - objects.len())
    }
}
