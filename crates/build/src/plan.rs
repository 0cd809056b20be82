//! Analysis stages combined into one build plan.

use crate::archiver::{BuildInput, BundleBuild};
use crate::collector::DependencyCollector;
use crate::emitter::EmittedResources;
use crate::error::BuildResult;
use crate::source::{DependencySource, VariantInspector};
use crate::synthesizer::{SharedGroup, synthesize};
use crate::variant;
use satchel_core::config::BuildConfig;
use satchel_core::{
    ASSET_MAP_ASSET_NAME, ASSET_MAP_BUNDLE_NAME, ATLAS_BUNDLE_MAP_ASSET_NAME, AssetMap,
    BUNDLE_MAP_ASSET_NAME, BUNDLE_MAP_BUNDLE_NAME, BuildRecord, BundleMap, BundleMapEntry, Group,
    MANIFEST_BUNDLE_NAME, VariantGroup, real_bundle_name,
};
use tracing::{info, instrument};

/// Everything the orchestrator needs, derived from the groups alone.
#[derive(Clone, Debug, Default)]
pub struct BuildPlan {
    pub groups: Vec<Group>,
    pub shared_groups: Vec<SharedGroup>,
    /// Primary entries in declaration order, then hoisted entries.
    pub asset_map: AssetMap,
    pub bundle_map: BundleMap,
    pub variant_groups: Vec<VariantGroup>,
    pub records: Vec<BuildRecord>,
}

impl BuildPlan {
    /// Run collection, synthesis and variant classification.
    #[instrument(skip_all, fields(groups = groups.len()))]
    pub fn analyze(
        groups: &[Group],
        dependencies: &dyn DependencySource,
        inspector: &dyn VariantInspector,
        config: &BuildConfig,
    ) -> BuildResult<Self> {
        let collection = DependencyCollector::new(dependencies, &config.excluded_content_types)
            .collect(groups)?;
        let synthesis = synthesize(&collection)?;

        let mut asset_map = AssetMap {
            entries: collection.primary_entries,
        };
        asset_map.entries.extend(synthesis.asset_entries);

        let obfuscate = config.obfuscate_bundle_names;
        let mut bundle_map = BundleMap::new();
        let mut records = Vec::with_capacity(groups.len() + synthesis.shared_groups.len());

        for group in groups {
            let real = real_bundle_name(group.name(), obfuscate);
            records.push(BuildRecord {
                file_name: group.name().to_string(),
                archive_name: real.clone(),
                shared: false,
                shared_info: String::new(),
            });
            bundle_map.push(BundleMapEntry::new(group.name(), real))?;
        }
        for shared in &synthesis.shared_groups {
            let real = real_bundle_name(shared.bundle_name(), obfuscate);
            records.push(BuildRecord {
                file_name: shared.bundle_name().to_string(),
                archive_name: real.clone(),
                shared: true,
                shared_info: shared.shared_info(),
            });
            bundle_map.push(
                BundleMapEntry::new(shared.bundle_name(), real)
                    .with_contributing_groups(shared.contributing_groups.clone()),
            )?;
        }

        let variant_groups = variant::classify(&asset_map, inspector)?;
        variant::apply(&mut bundle_map, &variant_groups, &config.variant_prefix);

        for name in [
            MANIFEST_BUNDLE_NAME,
            ASSET_MAP_BUNDLE_NAME,
            BUNDLE_MAP_BUNDLE_NAME,
        ] {
            bundle_map.push(BundleMapEntry::new(name, name))?;
        }

        info!(
            bundles = bundle_map.len(),
            shared = synthesis.shared_groups.len(),
            variants = variant_groups.len(),
            "build plan ready"
        );
        Ok(Self {
            groups: groups.to_vec(),
            shared_groups: synthesis.shared_groups,
            asset_map,
            bundle_map,
            variant_groups,
            records,
        })
    }

    fn inputs_of(&self, bundle_name: &str, paths: &[String]) -> Vec<BuildInput> {
        paths
            .iter()
            .map(|path| {
                let logical = self
                    .asset_map
                    .in_bundle(bundle_name)
                    .find(|e| &e.source_path == path)
                    .map(|e| e.logical_name.clone())
                    .unwrap_or_else(|| satchel_core::content::file_stem(path).to_string());
                BuildInput::new(path.as_str(), logical)
            })
            .collect()
    }

    /// Base pass: primary groups, shared groups, then the map bundles.
    pub fn base_builds(&self, resources: &EmittedResources) -> Vec<BundleBuild> {
        let mut builds = Vec::with_capacity(self.groups.len() + self.shared_groups.len() + 2);

        for group in &self.groups {
            builds.push(BundleBuild {
                bundle_name: group.name().to_string(),
                storage_name: self.storage_name(group.name()),
                inputs: group
                    .members()
                    .iter()
                    .map(|m| BuildInput::new(m.source_path(), m.logical_name()))
                    .collect(),
            });
        }
        for shared in &self.shared_groups {
            builds.push(BundleBuild {
                bundle_name: shared.bundle_name().to_string(),
                storage_name: self.storage_name(shared.bundle_name()),
                inputs: self.inputs_of(shared.bundle_name(), &shared.source_paths),
            });
        }

        builds.push(BundleBuild {
            bundle_name: BUNDLE_MAP_BUNDLE_NAME.to_string(),
            storage_name: BUNDLE_MAP_BUNDLE_NAME.to_string(),
            inputs: vec![BuildInput::new(
                resources.bundle_map.as_str(),
                BUNDLE_MAP_ASSET_NAME,
            )],
        });
        builds.push(BundleBuild {
            bundle_name: ASSET_MAP_BUNDLE_NAME.to_string(),
            storage_name: ASSET_MAP_BUNDLE_NAME.to_string(),
            inputs: vec![
                BuildInput::new(resources.asset_map.as_str(), ASSET_MAP_ASSET_NAME),
                BuildInput::new(
                    resources.atlas_bundle_map.as_str(),
                    ATLAS_BUNDLE_MAP_ASSET_NAME,
                ),
            ],
        });
        builds
    }

    /// Variant pass: one build per variant group, stored under its bundle name.
    pub fn variant_builds(&self) -> Vec<BundleBuild> {
        self.variant_groups
            .iter()
            .map(|group| BundleBuild {
                bundle_name: group.bundle_name.clone(),
                storage_name: group.bundle_name.clone(),
                inputs: self.inputs_of(&group.bundle_name, &group.source_paths),
            })
            .collect()
    }

    fn storage_name(&self, bundle_name: &str) -> String {
        self.bundle_map
            .get(bundle_name)
            .map(|e| e.real_bundle_name.clone())
            .unwrap_or_else(|| bundle_name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AssetCatalog, CatalogEntry};
    use crate::error::BuildError;
    use satchel_core::{ContentReference, SharedGroupKey};

    fn group(name: &str, paths: &[&str]) -> Group {
        Group::new(
            name,
            paths
                .iter()
                .map(|p| ContentReference::new(*p).unwrap())
                .collect(),
        )
        .unwrap()
    }

    fn catalog() -> AssetCatalog {
        AssetCatalog::new()
            .with_asset("ui/menu.prefab", ["shared.png", "ui/menu.cs"])
            .with_asset("hud/bar.prefab", ["shared.png"])
            .with_entry(CatalogEntry::new("ui/menu.cs").content_type("script"))
            .with_entry(CatalogEntry::new("shared.png").packing_tag("common"))
    }

    fn groups() -> Vec<Group> {
        vec![
            group("ui", &["ui/menu.prefab"]),
            group("hud", &["hud/bar.prefab"]),
        ]
    }

    #[test]
    fn test_bundle_map_layout() {
        let catalog = catalog();
        let plan = BuildPlan::analyze(&groups(), &catalog, &catalog, &BuildConfig::default())
            .unwrap();
        let key = SharedGroupKey::compute(["hud", "ui"]);

        let names: Vec<_> = plan
            .bundle_map
            .entries()
            .iter()
            .map(|e| e.bundle_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["ui", "hud", key.as_str(), "manifest", "assetmap", "bundlemap"]
        );

        let shared = plan.bundle_map.get(key.as_str()).unwrap();
        assert_eq!(
            shared.contributing_groups.as_deref(),
            Some(&["hud".to_string(), "ui".to_string()][..])
        );
        assert_eq!(
            shared.variant_bundle_name,
            Some(format!("astc_{}", key.as_str()))
        );
    }

    #[test]
    fn test_obfuscation_leaves_infrastructure_names() {
        let catalog = catalog();
        let config = BuildConfig {
            obfuscate_bundle_names: true,
            ..BuildConfig::default()
        };
        let plan = BuildPlan::analyze(&groups(), &catalog, &catalog, &config).unwrap();

        let ui = plan.bundle_map.get("ui").unwrap();
        assert_eq!(ui.real_bundle_name.len(), 64);
        assert_ne!(ui.real_bundle_name, "ui");
        for name in satchel_core::INFRASTRUCTURE_BUNDLES {
            assert_eq!(plan.bundle_map.get(name).unwrap().real_bundle_name, name);
        }
    }

    #[test]
    fn test_records_describe_shared_bundles() {
        let catalog = catalog();
        let plan = BuildPlan::analyze(&groups(), &catalog, &catalog, &BuildConfig::default())
            .unwrap();

        assert_eq!(plan.records.len(), 3);
        assert!(!plan.records[0].shared);
        assert!(plan.records[2].shared);
        assert_eq!(plan.records[2].shared_info, "depend: hud,ui");
    }

    #[test]
    fn test_builds_reference_emitted_resources() {
        let catalog = catalog();
        let plan = BuildPlan::analyze(&groups(), &catalog, &catalog, &BuildConfig::default())
            .unwrap();
        let resources = EmittedResources::under("generated");
        let builds = plan.base_builds(&resources);

        assert_eq!(builds.len(), 5);
        let bundlemap = &builds[3];
        assert_eq!(bundlemap.storage_name, "bundlemap");
        assert_eq!(bundlemap.inputs[0].source_path, "generated/bundle_map.json");
        assert_eq!(bundlemap.inputs[0].logical_name, "bundle_map");

        let variants = plan.variant_builds();
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].inputs, vec![BuildInput::new("shared.png", "shared")]);
    }

    #[test]
    fn test_group_named_like_infrastructure_is_rejected() {
        let catalog = catalog();
        let groups = vec![group("manifest", &["ui/menu.prefab"])];
        assert!(matches!(
            BuildPlan::analyze(&groups, &catalog, &catalog, &BuildConfig::default()),
            Err(BuildError::Core(_))
        ));
    }
}
