//! Turning stored bytes into loaded archives.

use crate::error::RuntimeResult;
use bytes::Bytes;
use satchel_core::ArchiveDocument;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A loaded archive unit.
pub trait Archive: Send + Sync + fmt::Debug {
    /// Logical bundle name the archive was built as.
    fn name(&self) -> &str;

    /// Payload of an asset by logical name.
    fn asset(&self, logical_name: &str) -> Option<Bytes>;

    /// Logical names of every asset in the archive.
    fn asset_names(&self) -> Vec<String>;
}

/// Shared handle to a loaded archive.
pub type BundleHandle = Arc<dyn Archive>;

/// Parses archive bytes read from storage.
pub trait ArchiveReader: Send + Sync {
    fn read(&self, storage_name: &str, data: Bytes) -> RuntimeResult<BundleHandle>;
}

/// An archive with every payload decoded up front.
#[derive(Clone, Debug)]
pub struct LoadedArchive {
    name: String,
    assets: BTreeMap<String, Bytes>,
}

impl LoadedArchive {
    pub fn new(name: impl Into<String>, assets: BTreeMap<String, Bytes>) -> Self {
        Self {
            name: name.into(),
            assets,
        }
    }
}

impl Archive for LoadedArchive {
    fn name(&self) -> &str {
        &self.name
    }

    fn asset(&self, logical_name: &str) -> Option<Bytes> {
        self.assets.get(logical_name).cloned()
    }

    fn asset_names(&self) -> Vec<String> {
        self.assets.keys().cloned().collect()
    }
}

/// Reader for [`ArchiveDocument`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentReader;

impl ArchiveReader for DocumentReader {
    fn read(&self, _storage_name: &str, data: Bytes) -> RuntimeResult<BundleHandle> {
        let document = ArchiveDocument::from_bytes(&data)?;
        let mut assets = BTreeMap::new();
        for (logical_name, asset) in &document.assets {
            assets.insert(logical_name.clone(), asset.decode()?);
        }
        Ok(Arc::new(LoadedArchive::new(document.bundle_name, assets)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeError;
    use satchel_core::{ArchiveFormat, ArchivedAsset};

    #[test]
    fn test_reads_document() {
        let mut document = ArchiveDocument::new("ui", ArchiveFormat::Default);
        document
            .insert("menu", ArchivedAsset::new("ui/menu.prefab", b"menu"))
            .unwrap();
        let handle = DocumentReader
            .read("ui", document.to_bytes().unwrap())
            .unwrap();

        assert_eq!(handle.name(), "ui");
        assert_eq!(handle.asset("menu"), Some(Bytes::from_static(b"menu")));
        assert_eq!(handle.asset("missing"), None);
        assert_eq!(handle.asset_names(), vec!["menu"]);
    }

    #[test]
    fn test_rejects_garbage() {
        let err = DocumentReader
            .read("ui", Bytes::from_static(b"not an archive"))
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Core(_)));
    }
}
