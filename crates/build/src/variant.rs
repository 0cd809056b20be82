//! Variant classification: which bundles need a second, format-substituted build.

use crate::error::BuildResult;
use crate::source::VariantInspector;
use satchel_core::{AssetMap, BundleMap, VariantGroup, variant_bundle_name};
use std::collections::HashMap;
use tracing::{instrument, warn};

/// Group variant-requiring assets per bundle.
///
/// Paths keep asset map order; groups are ordered by the first asset that
/// required a variant.
#[instrument(skip_all, fields(assets = asset_map.entries.len()))]
pub fn classify(
    asset_map: &AssetMap,
    inspector: &dyn VariantInspector,
) -> BuildResult<Vec<VariantGroup>> {
    let mut groups: Vec<VariantGroup> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for entry in &asset_map.entries {
        if !inspector.requires_variant(&entry.source_path)? {
            continue;
        }
        match positions.get(entry.bundle_name.as_str()) {
            Some(&position) => groups[position]
                .source_paths
                .push(entry.source_path.clone()),
            None => {
                positions.insert(&entry.bundle_name, groups.len());
                groups.push(VariantGroup {
                    bundle_name: entry.bundle_name.clone(),
                    source_paths: vec![entry.source_path.clone()],
                });
            }
        }
    }
    Ok(groups)
}

/// Flag the bundle map entries of every variant group.
pub fn apply(bundle_map: &mut BundleMap, groups: &[VariantGroup], prefix: &str) {
    for group in groups {
        match bundle_map.get_mut(&group.bundle_name) {
            Some(entry) => entry.set_variant(variant_bundle_name(prefix, &group.bundle_name)),
            None => warn!(bundle = %group.bundle_name, "variant group has no bundle map entry"),
        }
    }
}
