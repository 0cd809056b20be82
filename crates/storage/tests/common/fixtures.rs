use bytes::Bytes;
use satchel_storage::{FilesystemBackend, MemoryBackend, ObjectStore};
use std::sync::Arc;
use tempfile::TempDir;

/// Generate deterministic test data using a seeded pseudo-random generator.
/// Same seed produces same output (reproducible tests).
#[allow(dead_code)]
pub fn seeded_bytes(seed: u64, len: usize) -> Bytes {
    let mut data = vec![0u8; len];
    let mut state = seed;

    for chunk in data.chunks_mut(8) {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let bytes = state.to_le_bytes();
        for (i, byte) in chunk.iter_mut().enumerate() {
            *byte = bytes[i % 8];
        }
    }

    Bytes::from(data)
}

/// One instance of every backend. The TempDir must outlive the stores.
#[allow(dead_code)]
pub async fn backends() -> (TempDir, Vec<Arc<dyn ObjectStore>>) {
    let dir = tempfile::tempdir().unwrap();
    let fs = FilesystemBackend::new(dir.path().join("store")).await.unwrap();
    let stores: Vec<Arc<dyn ObjectStore>> = vec![Arc::new(fs), Arc::new(MemoryBackend::new())];
    (dir, stores)
}
