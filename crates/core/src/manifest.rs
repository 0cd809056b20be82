//! Dependency manifest: the archiver's record of inter-bundle edges.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Direct dependencies of every bundle in a build.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyManifest {
    bundles: BTreeMap<String, Vec<String>>,
}

impl DependencyManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a bundle and its direct dependencies (sorted, deduplicated).
    pub fn insert<I, S>(&mut self, bundle_name: impl Into<String>, dependencies: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let deps: BTreeSet<String> = dependencies.into_iter().map(Into::into).collect();
        self.bundles
            .insert(bundle_name.into(), deps.into_iter().collect());
    }

    /// Direct dependencies of a bundle. Unknown bundles have none.
    pub fn dependencies(&self, bundle_name: &str) -> &[String] {
        self.bundles
            .get(bundle_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Transitive dependencies of a bundle, excluding the bundle itself.
    pub fn all_dependencies(&self, bundle_name: &str) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<&str> = self.dependencies(bundle_name).iter().map(String::as_str).collect();
        while let Some(name) = stack.pop() {
            if name == bundle_name || !seen.insert(name.to_string()) {
                continue;
            }
            stack.extend(self.dependencies(name).iter().map(String::as_str));
        }
        seen.into_iter().collect()
    }

    pub fn contains(&self, bundle_name: &str) -> bool {
        self.bundles.contains_key(bundle_name)
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    pub fn to_json(&self) -> crate::Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn from_json(data: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}
