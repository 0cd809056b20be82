//! Hoists files referenced by groups into synthetic shared groups.

use crate::collector::Collection;
use crate::error::{BuildError, BuildResult};
use satchel_core::content::file_stem;
use satchel_core::{AssetMapEntry, SharedGroupKey};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// A synthesized group holding non-primary files with the same owners.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SharedGroup {
    pub key: SharedGroupKey,
    /// Sorted owning groups that produced the key.
    pub contributing_groups: Vec<String>,
    /// Member source paths, sorted.
    pub source_paths: Vec<String>,
}

impl SharedGroup {
    pub fn bundle_name(&self) -> &str {
        self.key.as_str()
    }

    /// `depend: a,b` line used by build records.
    pub fn shared_info(&self) -> String {
        format!("depend: {}", self.contributing_groups.join(","))
    }
}

#[derive(Debug, Default)]
pub struct Synthesis {
    /// Asset map entries of hoisted files, sorted by source path.
    pub asset_entries: Vec<AssetMapEntry>,
    /// Shared groups in order of first sighting.
    pub shared_groups: Vec<SharedGroup>,
}

/// Assign every non-primary file in the index to the shared group keyed by
/// its owner set. Output order only depends on the index contents.
#[instrument(skip_all, fields(referenced = collection.index.len()))]
pub fn synthesize(collection: &Collection) -> BuildResult<Synthesis> {
    let mut synthesis = Synthesis::default();
    let mut positions: HashMap<SharedGroupKey, usize> = HashMap::new();

    for (path, owners) in &collection.index {
        if collection.is_primary(path) {
            continue;
        }
        if owners.is_empty() {
            return Err(BuildError::InvalidSharedKey {
                path: path.clone(),
                owners: String::new(),
            });
        }
        let key = SharedGroupKey::compute(owners);
        if !key.is_valid() {
            return Err(BuildError::InvalidSharedKey {
                path: path.clone(),
                owners: owners.iter().cloned().collect::<Vec<_>>().join(","),
            });
        }

        synthesis.asset_entries.push(AssetMapEntry::new(
            path.as_str(),
            key.as_str(),
            file_stem(path),
        ));

        match positions.get(&key) {
            Some(&position) => synthesis.shared_groups[position]
                .source_paths
                .push(path.clone()),
            None => {
                positions.insert(key.clone(), synthesis.shared_groups.len());
                synthesis.shared_groups.push(SharedGroup {
                    key,
                    contributing_groups: owners.iter().cloned().collect(),
                    source_paths: vec![path.clone()],
                });
            }
        }
    }

    debug!(
        hoisted = synthesis.asset_entries.len(),
        shared_groups = synthesis.shared_groups.len(),
        "synthesized shared groups"
    );
    Ok(synthesis)
}
