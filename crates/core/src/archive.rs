//! Archive document used by the reference archiver and reader.
//!
//! The document is a JSON object holding base64 payloads keyed by logical
//! asset name. It exists so builds can be produced and consumed end to end
//! without a host engine; any archiver that honors the naming contract can
//! replace it.

use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Texture format settings an archive was built with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    /// Platform default compression.
    #[default]
    Default,
    /// Alternate compressed-texture encoding produced by the variant pass.
    Variant,
}

/// One packaged asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedAsset {
    pub source_path: String,
    /// Base64-encoded payload.
    pub data: String,
}

impl ArchivedAsset {
    pub fn new(source_path: impl Into<String>, data: &[u8]) -> Self {
        Self {
            source_path: source_path.into(),
            data: base64::engine::general_purpose::STANDARD.encode(data),
        }
    }

    /// Decode the payload.
    pub fn decode(&self) -> crate::Result<Bytes> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map(Bytes::from)
            .map_err(|e| {
                crate::Error::ArchiveIntegrity(format!(
                    "payload of {} is not valid base64: {e}",
                    self.source_path
                ))
            })
    }
}

/// A bundle at rest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveDocument {
    pub bundle_name: String,
    #[serde(default)]
    pub format: ArchiveFormat,
    pub assets: BTreeMap<String, ArchivedAsset>,
}

impl ArchiveDocument {
    pub fn new(bundle_name: impl Into<String>, format: ArchiveFormat) -> Self {
        Self {
            bundle_name: bundle_name.into(),
            format,
            assets: BTreeMap::new(),
        }
    }

    /// Add an asset. Logical names must be unique within one archive.
    pub fn insert(
        &mut self,
        logical_name: impl Into<String>,
        asset: ArchivedAsset,
    ) -> crate::Result<()> {
        let logical_name = logical_name.into();
        if let Some(existing) = self.assets.get(&logical_name) {
            return Err(crate::Error::ArchiveIntegrity(format!(
                "logical name {logical_name} in bundle {} is used by both {} and {}",
                self.bundle_name, existing.source_path, asset.source_path
            )));
        }
        self.assets.insert(logical_name, asset);
        Ok(())
    }

    pub fn to_bytes(&self) -> crate::Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }

    pub fn from_bytes(data: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}

/// Side-car metadata written next to each archive as `<name>.manifest`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveSidecar {
    pub bundle_name: String,
    pub format: ArchiveFormat,
    pub assets: Vec<String>,
    pub dependencies: Vec<String>,
}

impl ArchiveSidecar {
    pub fn to_bytes(&self) -> crate::Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec_pretty(self)?))
    }

    pub fn from_bytes(data: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_payload_decodes() {
        let asset = ArchivedAsset::new("ui/a.png", b"\x89PNG");
        assert_eq!(asset.decode().unwrap(), Bytes::from_static(b"\x89PNG"));
    }

    #[test]
    fn test_corrupt_payload_is_integrity_error() {
        let asset = ArchivedAsset {
            source_path: "ui/a.png".to_string(),
            data: "not base64!".to_string(),
        };
        assert!(matches!(
            asset.decode(),
            Err(crate::Error::ArchiveIntegrity(_))
        ));
    }

    #[test]
    fn test_duplicate_logical_name_rejected() {
        let mut doc = ArchiveDocument::new("ui", ArchiveFormat::Default);
        doc.insert("a", ArchivedAsset::new("ui/a.png", b"1")).unwrap();
        let err = doc
            .insert("a", ArchivedAsset::new("ui/nested/a.png", b"2"))
            .unwrap_err();
        assert!(err.to_string().contains("ui/nested/a.png"));
    }

    #[test]
    fn test_format_defaults_when_missing() {
        let doc = ArchiveDocument::from_bytes(br#"{"bundle_name":"ui","assets":{}}"#).unwrap();
        assert_eq!(doc.format, ArchiveFormat::Default);
    }
}
