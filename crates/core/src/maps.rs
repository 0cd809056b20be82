//! Build output lookup tables: bundle map, asset map, atlas bundle map.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One bundle produced by a build.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleMapEntry {
    /// Logical bundle name, used by dependency resolution.
    pub bundle_name: String,
    /// Name of the archive at rest.
    pub real_bundle_name: String,
    /// Owning groups of a synthesized shared bundle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributing_groups: Option<Vec<String>>,
    /// Whether a format-substituted variant archive exists.
    #[serde(default)]
    pub has_variant: bool,
    /// Storage name of the variant archive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_bundle_name: Option<String>,
}

impl BundleMapEntry {
    pub fn new(bundle_name: impl Into<String>, real_bundle_name: impl Into<String>) -> Self {
        Self {
            bundle_name: bundle_name.into(),
            real_bundle_name: real_bundle_name.into(),
            contributing_groups: None,
            has_variant: false,
            variant_bundle_name: None,
        }
    }

    pub fn with_contributing_groups(mut self, groups: Vec<String>) -> Self {
        self.contributing_groups = Some(groups);
        self
    }

    /// Flag this bundle as having a variant stored under `variant_name`.
    pub fn set_variant(&mut self, variant_name: impl Into<String>) {
        self.has_variant = true;
        self.variant_bundle_name = Some(variant_name.into());
    }

    /// The storage name to read, honoring the variant preference.
    pub fn storage_name(&self, use_variant: bool) -> &str {
        match (&self.variant_bundle_name, use_variant && self.has_variant) {
            (Some(variant), true) => variant,
            _ => &self.real_bundle_name,
        }
    }
}

/// Bundle map with O(1) lookup by logical bundle name.
///
/// Serialized as a plain list of entries; bundle names must be unique.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<BundleMapEntry>", into = "Vec<BundleMapEntry>")]
pub struct BundleMap {
    entries: Vec<BundleMapEntry>,
    index: HashMap<String, usize>,
}

impl BundleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Fails if the bundle name is already mapped.
    pub fn push(&mut self, entry: BundleMapEntry) -> crate::Result<()> {
        if self.index.contains_key(&entry.bundle_name) {
            return Err(crate::Error::Config(format!(
                "bundle listed twice in bundle map: {}",
                entry.bundle_name
            )));
        }
        self.index
            .insert(entry.bundle_name.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    pub fn get(&self, bundle_name: &str) -> Option<&BundleMapEntry> {
        self.index.get(bundle_name).map(|&i| &self.entries[i])
    }

    pub fn get_mut(&mut self, bundle_name: &str) -> Option<&mut BundleMapEntry> {
        self.index.get(bundle_name).map(|&i| &mut self.entries[i])
    }

    pub fn contains(&self, bundle_name: &str) -> bool {
        self.index.contains_key(bundle_name)
    }

    pub fn entries(&self) -> &[BundleMapEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> crate::Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn from_json(data: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}

impl TryFrom<Vec<BundleMapEntry>> for BundleMap {
    type Error = crate::Error;

    fn try_from(entries: Vec<BundleMapEntry>) -> crate::Result<Self> {
        let mut map = Self::new();
        for entry in entries {
            map.push(entry)?;
        }
        Ok(map)
    }
}

impl From<BundleMap> for Vec<BundleMapEntry> {
    fn from(map: BundleMap) -> Self {
        map.entries
    }
}

/// Where an original source file ended up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMapEntry {
    pub source_path: String,
    pub bundle_name: String,
    pub logical_name: String,
}

impl AssetMapEntry {
    pub fn new(
        source_path: impl Into<String>,
        bundle_name: impl Into<String>,
        logical_name: impl Into<String>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            bundle_name: bundle_name.into(),
            logical_name: logical_name.into(),
        }
    }
}

/// The full asset map, in emission order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetMap {
    pub entries: Vec<AssetMapEntry>,
}

impl AssetMap {
    /// Find the entry for a source path.
    pub fn find(&self, source_path: &str) -> Option<&AssetMapEntry> {
        self.entries.iter().find(|e| e.source_path == source_path)
    }

    /// Entries assigned to one bundle.
    pub fn in_bundle<'a>(&'a self, bundle_name: &'a str) -> impl Iterator<Item = &'a AssetMapEntry> {
        self.entries
            .iter()
            .filter(move |e| e.bundle_name == bundle_name)
    }

    pub fn to_json(&self) -> crate::Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn from_json(data: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}

/// A bundle that needs a second, format-substituted build.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantGroup {
    pub bundle_name: String,
    pub source_paths: Vec<String>,
}

/// All variant groups of a build, shipped for tooling.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AtlasBundleMap {
    pub groups: Vec<VariantGroup>,
}

impl AtlasBundleMap {
    pub fn to_json(&self) -> crate::Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// Human-readable build report line for one bundle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecord {
    pub file_name: String,
    pub archive_name: String,
    pub shared: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub shared_info: String,
}
