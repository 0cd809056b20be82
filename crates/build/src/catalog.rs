//! JSON asset catalog: a self-contained dependency source for hosts
//! without an engine database.
//!
//! ```json
//! {
//!   "assets": [
//!     { "path": "ui/menu.prefab", "references": ["shared.png"] },
//!     { "path": "shared.png", "packing_tag": "common" },
//!     { "path": "ui/menu.cs", "content_type": "script" }
//!   ]
//! }
//! ```

use crate::error::{BuildError, BuildResult};
use crate::source::{DEFAULT_CONTENT_TYPE, DependencySource, VariantInspector};
use satchel_core::content::normalize_source_path;
use satchel_storage::ObjectStore;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument};

/// One file known to the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub path: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    /// Direct references to other files.
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packing_tag: Option<String>,
}

fn default_content_type() -> String {
    DEFAULT_CONTENT_TYPE.to_string()
}

impl CatalogEntry {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content_type: default_content_type(),
            references: Vec::new(),
            packing_tag: None,
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn references<I, S>(mut self, references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.references = references.into_iter().map(Into::into).collect();
        self
    }

    pub fn packing_tag(mut self, tag: impl Into<String>) -> Self {
        self.packing_tag = Some(tag.into());
        self
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    assets: Vec<CatalogEntry>,
}

/// In-memory asset catalog keyed by normalized source path.
#[derive(Clone, Debug, Default)]
pub struct AssetCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry.
    pub fn with_entry(mut self, entry: CatalogEntry) -> Self {
        self.insert(entry);
        self
    }

    /// Add a plain asset with direct references.
    pub fn with_asset<I, S>(self, path: impl Into<String>, references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_entry(CatalogEntry::new(path).references(references))
    }

    pub fn insert(&mut self, mut entry: CatalogEntry) {
        entry.path = normalize_source_path(&entry.path);
        entry.references = entry
            .references
            .iter()
            .map(|r| normalize_source_path(r))
            .collect();
        self.entries.insert(entry.path.clone(), entry);
    }

    pub fn get(&self, path: &str) -> Option<&CatalogEntry> {
        self.entries.get(&normalize_source_path(path))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_json(data: &[u8]) -> BuildResult<Self> {
        let document: CatalogDocument = serde_json::from_slice(data)?;
        let mut catalog = Self::new();
        for entry in document.assets {
            catalog.insert(entry);
        }
        Ok(catalog)
    }

    pub fn to_json(&self) -> BuildResult<Vec<u8>> {
        let document = CatalogDocument {
            assets: self.entries.values().cloned().collect(),
        };
        Ok(serde_json::to_vec_pretty(&document)?)
    }

    /// Read a catalog from a store.
    #[instrument(skip(store))]
    pub async fn load(store: &dyn ObjectStore, key: &str) -> BuildResult<Self> {
        let data = store.get(key).await?;
        let catalog = Self::from_json(&data).map_err(|e| BuildError::Dependency {
            path: key.to_string(),
            message: format!("invalid catalog: {e}"),
        })?;
        debug!(entries = catalog.len(), "loaded asset catalog");
        Ok(catalog)
    }
}

impl DependencySource for AssetCatalog {
    fn dependencies(&self, path: &str) -> BuildResult<Vec<String>> {
        let root = normalize_source_path(path);
        let mut seen = BTreeSet::new();
        let mut pending = vec![root.clone()];

        while let Some(current) = pending.pop() {
            let Some(entry) = self.entries.get(&current) else {
                continue;
            };
            for reference in &entry.references {
                if seen.insert(reference.clone()) {
                    pending.push(reference.clone());
                }
            }
        }

        seen.remove(&root);
        Ok(seen.into_iter().collect())
    }

    fn content_type(&self, path: &str) -> BuildResult<String> {
        Ok(self
            .get(path)
            .map(|e| e.content_type.clone())
            .unwrap_or_else(default_content_type))
    }
}

impl VariantInspector for AssetCatalog {
    fn packing_tag(&self, path: &str) -> BuildResult<Option<String>> {
        Ok(self.get(path).and_then(|e| e.packing_tag.clone()))
    }
}
