use async_trait::async_trait;
use bytes::Bytes;
use satchel_storage::{ObjectStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Object store wrapper counting reads per key, with an optional read delay
/// to widen race windows and injectable read failures.
pub struct CountingStore {
    inner: Arc<dyn ObjectStore>,
    reads: Mutex<HashMap<String, usize>>,
    failures: Mutex<HashMap<String, usize>>,
    delay: Option<Duration>,
}

#[allow(dead_code)]
impl CountingStore {
    pub fn new(inner: Arc<dyn ObjectStore>) -> Self {
        Self {
            inner,
            reads: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail the next `count` reads of `key` with an I/O error.
    pub fn fail_reads(&self, key: &str, count: usize) {
        self.failures.lock().unwrap().insert(key.to_string(), count);
    }

    pub fn reads(&self, key: &str) -> usize {
        self.reads.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    pub fn total_reads(&self) -> usize {
        self.reads.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl ObjectStore for CountingStore {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key).await
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        *self.reads.lock().unwrap().entry(key.to_string()).or_default() += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(remaining) = self.failures.lock().unwrap().get_mut(key)
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(StorageError::Io(std::io::Error::other(format!(
                "injected read failure for {key}"
            ))));
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        self.inner.put(key, data).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.inner.delete(key).await
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.inner.list(prefix).await
    }

    async fn copy(&self, from: &str, to: &str) -> StorageResult<()> {
        self.inner.copy(from, to).await
    }

    fn backend_name(&self) -> &'static str {
        "counting"
    }
}
