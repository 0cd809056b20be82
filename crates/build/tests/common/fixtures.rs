use bytes::Bytes;
use satchel_build::{AssetCatalog, CatalogEntry};
use satchel_core::config::{AppConfig, GroupConfig};
use satchel_storage::{MemoryBackend, ObjectStore};
use std::sync::Arc;

/// Two prefab groups sharing a texture and a font; the ui group also
/// references a packed icon and a script.
pub fn scenario_catalog() -> AssetCatalog {
    AssetCatalog::new()
        .with_asset(
            "ui/menu.prefab",
            ["textures/shared.png", "ui/icon.png", "common/font.ttf"],
        )
        .with_asset(
            "hud/bar.prefab",
            ["textures/shared.png", "common/font.ttf", "scripts/logic.cs"],
        )
        .with_entry(CatalogEntry::new("ui/icon.png").packing_tag("ui_atlas"))
        .with_entry(CatalogEntry::new("scripts/logic.cs").content_type("script"))
}

/// Source store holding every scenario file plus `catalog.json`.
#[allow(dead_code)]
pub async fn scenario_source() -> Arc<MemoryBackend> {
    let store = MemoryBackend::with_objects([
        ("ui/menu.prefab", "menu prefab"),
        ("ui/icon.png", "icon pixels"),
        ("hud/bar.prefab", "bar prefab"),
        ("textures/shared.png", "shared pixels"),
        ("common/font.ttf", "font glyphs"),
        ("scripts/logic.cs", "class Logic {}"),
    ]);
    let catalog = scenario_catalog().to_json().unwrap();
    store
        .put("catalog.json", Bytes::from(catalog))
        .await
        .unwrap();
    Arc::new(store)
}

/// In-memory config declaring the `ui` and `hud` prefab groups.
#[allow(dead_code)]
pub fn scenario_config() -> AppConfig {
    let mut config = AppConfig::for_testing();
    config.build.groups = ["ui", "hud"]
        .into_iter()
        .map(|dir| GroupConfig::Directory {
            dir: dir.to_string(),
            suffix: ".prefab".to_string(),
            prefix: String::new(),
        })
        .collect();
    config
}
