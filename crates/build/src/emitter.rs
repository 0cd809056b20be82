//! Writes the build maps as source files the archiver packages.

use crate::error::BuildResult;
use crate::plan::BuildPlan;
use bytes::Bytes;
use satchel_core::AtlasBundleMap;
use satchel_storage::ObjectStore;
use tracing::{debug, instrument};

/// Source store keys of the emitted map resources.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmittedResources {
    pub bundle_map: String,
    pub asset_map: String,
    pub atlas_bundle_map: String,
    pub build_records: String,
}

impl EmittedResources {
    /// Resource keys inside `dir`.
    pub fn under(dir: &str) -> Self {
        let dir = dir.trim_matches('/');
        let key = |file: &str| {
            if dir.is_empty() {
                file.to_string()
            } else {
                format!("{dir}/{file}")
            }
        };
        Self {
            bundle_map: key("bundle_map.json"),
            asset_map: key("asset_map.json"),
            atlas_bundle_map: key("atlas_bundle_map.json"),
            build_records: key("build_records.json"),
        }
    }
}

/// Serialize the plan's maps into `dir` of the source store.
#[instrument(skip(store, plan), fields(backend = store.backend_name()))]
pub async fn emit(
    store: &dyn ObjectStore,
    dir: &str,
    plan: &BuildPlan,
) -> BuildResult<EmittedResources> {
    let resources = EmittedResources::under(dir);
    let atlas = AtlasBundleMap {
        groups: plan.variant_groups.clone(),
    };

    let files = [
        (&resources.bundle_map, plan.bundle_map.to_json()?),
        (&resources.asset_map, plan.asset_map.to_json()?),
        (&resources.atlas_bundle_map, atlas.to_json()?),
        (
            &resources.build_records,
            serde_json::to_vec_pretty(&plan.records)?,
        ),
    ];
    for (key, data) in files {
        debug!(key = %key, size = data.len(), "writing map resource");
        store.put(key, Bytes::from(data)).await?;
    }
    Ok(resources)
}
