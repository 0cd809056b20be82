//! Reverse dependency index: which groups reference which files.

use crate::error::{BuildError, BuildResult};
use crate::source::DependencySource;
use satchel_core::content::normalize_source_path;
use satchel_core::{AssetMapEntry, Group};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, instrument};

/// `source path -> owning group names`, both sorted.
pub type ReverseDependencyIndex = BTreeMap<String, BTreeSet<String>>;

/// Output of one collection pass.
#[derive(Debug, Default)]
pub struct Collection {
    pub index: ReverseDependencyIndex,
    /// Primary source path -> declaring group.
    pub primary_assets: BTreeMap<String, String>,
    /// Asset map entries of primary assets, in group declaration order.
    pub primary_entries: Vec<AssetMapEntry>,
}

impl Collection {
    pub fn is_primary(&self, source_path: &str) -> bool {
        self.primary_assets.contains_key(source_path)
    }
}

/// Walks every group member through a [`DependencySource`].
pub struct DependencyCollector<'a> {
    source: &'a dyn DependencySource,
    excluded_content_types: HashSet<String>,
}

impl<'a> DependencyCollector<'a> {
    pub fn new<I, S>(source: &'a dyn DependencySource, excluded_content_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            source,
            excluded_content_types: excluded_content_types
                .into_iter()
                .map(|t| t.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    fn is_excluded(&self, path: &str) -> BuildResult<bool> {
        if self.excluded_content_types.is_empty() {
            return Ok(false);
        }
        let content_type = self.source.content_type(path)?;
        Ok(self
            .excluded_content_types
            .contains(&content_type.to_ascii_lowercase()))
    }

    /// Build the reverse index for `groups`.
    ///
    /// Fails with [`BuildError::DuplicatePrimaryAsset`] before any
    /// dependency is queried if a source path is declared twice.
    #[instrument(skip_all, fields(groups = groups.len()))]
    pub fn collect(&self, groups: &[Group]) -> BuildResult<Collection> {
        let mut collection = Collection::default();

        for group in groups {
            for member in group.members() {
                let path = member.source_path();
                if let Some(first) = collection.primary_assets.get(path) {
                    return Err(BuildError::DuplicatePrimaryAsset {
                        path: path.to_string(),
                        first_group: first.clone(),
                        second_group: group.name().to_string(),
                    });
                }
                collection
                    .primary_assets
                    .insert(path.to_string(), group.name().to_string());
                collection.primary_entries.push(AssetMapEntry::new(
                    path,
                    group.name(),
                    member.logical_name(),
                ));
            }
        }

        for group in groups {
            for member in group.members() {
                for dependency in self.source.dependencies(member.source_path())? {
                    let dependency = normalize_source_path(&dependency);
                    if dependency.is_empty() || self.is_excluded(&dependency)? {
                        continue;
                    }
                    collection
                        .index
                        .entry(dependency)
                        .or_default()
                        .insert(group.name().to_string());
                }
            }
        }

        debug!(
            primary = collection.primary_assets.len(),
            referenced = collection.index.len(),
            "collected dependencies"
        );
        Ok(collection)
    }
}
