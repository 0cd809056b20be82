use bytes::Bytes;
use satchel_build::{AssetCatalog, CatalogEntry, pipeline};
use satchel_core::config::{AppConfig, GroupConfig};
use satchel_storage::{MemoryBackend, ObjectStore};
use std::sync::Arc;

/// `ui` and `hud` each hold one prefab referencing `shared.png`, which
/// carries a packing tag.
pub fn scenario_config() -> AppConfig {
    let mut config = AppConfig::for_testing();
    config.build.groups = ["ui", "hud"]
        .into_iter()
        .map(|dir| GroupConfig::Directory {
            dir: dir.to_string(),
            suffix: String::new(),
            prefix: String::new(),
        })
        .collect();
    config
}

/// Run the build pipeline into a fresh in-memory output store.
pub async fn built_output(config: &AppConfig) -> Arc<MemoryBackend> {
    let catalog = AssetCatalog::new()
        .with_asset("ui/menu.prefab", ["shared.png"])
        .with_asset("ui/settings.json", ["ui/menu.prefab"])
        .with_asset("hud/bar.prefab", ["shared.png"])
        .with_entry(CatalogEntry::new("shared.png").packing_tag("common"));
    let source = MemoryBackend::with_objects([
        ("ui/menu.prefab", Bytes::from_static(b"menu")),
        ("ui/settings.json", Bytes::from_static(b"{\"volume\": 7}")),
        ("hud/bar.prefab", Bytes::from_static(b"bar")),
        ("shared.png", Bytes::from_static(b"shared pixels")),
        ("catalog.json", Bytes::from(catalog.to_json().unwrap())),
    ]);
    let source: Arc<dyn ObjectStore> = Arc::new(source);
    let output = Arc::new(MemoryBackend::new());
    pipeline::run(config, source, output.clone()).await.unwrap();
    output
}
