//! Runtime bundle cache.
//!
//! Each bundle name owns a slot that moves from unloaded to loading to
//! loaded exactly once. Concurrent requests for the same name share one
//! storage read; a failed read leaves the slot empty so the next request
//! retries it. Slots are only removed by [`BundleCache::unload_all`].

use crate::error::{RuntimeError, RuntimeResult};
use crate::reader::{ArchiveReader, BundleHandle};
use bytes::Bytes;
use futures::future::try_join_all;
use satchel_core::config::RuntimeConfig;
use satchel_core::{
    BUNDLE_MAP_ASSET_NAME, BUNDLE_MAP_BUNDLE_NAME, BundleMap, DependencyManifest,
    MANIFEST_ASSET_NAME, MANIFEST_BUNDLE_NAME,
};
use satchel_storage::ObjectStore;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::OnceCell;
use tracing::{debug, error, info, instrument, warn};

/// Cache behavior switches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheOptions {
    /// Load the variant archive of bundles that have one.
    pub use_variant: bool,
}

impl From<&RuntimeConfig> for CacheOptions {
    fn from(config: &RuntimeConfig) -> Self {
        Self {
            use_variant: config.use_variant,
        }
    }
}

#[derive(Default)]
struct BundleSlot {
    handle: OnceCell<BundleHandle>,
    /// Set once every transitive dependency has been loaded.
    closure_loaded: AtomicBool,
}

impl BundleSlot {
    fn initialized(&self) -> bool {
        self.handle.initialized()
    }
}

type Slot = Arc<BundleSlot>;

/// Loads bundles by logical name together with their dependency closure.
pub struct BundleCache {
    store: Arc<dyn ObjectStore>,
    reader: Arc<dyn ArchiveReader>,
    manifest: Arc<DependencyManifest>,
    bundle_map: Arc<BundleMap>,
    options: CacheOptions,
    slots: Mutex<HashMap<String, Slot>>,
}

impl BundleCache {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        reader: Arc<dyn ArchiveReader>,
        manifest: DependencyManifest,
        bundle_map: BundleMap,
        options: CacheOptions,
    ) -> Self {
        Self {
            store,
            reader,
            manifest: Arc::new(manifest),
            bundle_map: Arc::new(bundle_map),
            options,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Read the manifest and bundle map bundles from `store` and build a cache
    /// over it.
    #[instrument(skip_all, fields(backend = store.backend_name()))]
    pub async fn initialize(
        store: Arc<dyn ObjectStore>,
        reader: Arc<dyn ArchiveReader>,
        options: CacheOptions,
    ) -> RuntimeResult<Self> {
        let manifest = read_infrastructure(
            store.as_ref(),
            reader.as_ref(),
            MANIFEST_BUNDLE_NAME,
            MANIFEST_ASSET_NAME,
        )
        .await?;
        let manifest = DependencyManifest::from_json(&manifest)?;

        let bundle_map = read_infrastructure(
            store.as_ref(),
            reader.as_ref(),
            BUNDLE_MAP_BUNDLE_NAME,
            BUNDLE_MAP_ASSET_NAME,
        )
        .await?;
        let bundle_map = BundleMap::from_json(&bundle_map)?;

        if manifest.is_empty() {
            warn!("dependency manifest lists no bundles");
        }
        info!(
            bundles = bundle_map.len(),
            dependencies = manifest.len(),
            use_variant = options.use_variant,
            "bundle cache initialized"
        );
        Ok(Self::new(store, reader, manifest, bundle_map, options))
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(|poisoned| {
            warn!("bundle cache lock was poisoned, recovering with into_inner()");
            poisoned.into_inner()
        })
    }

    fn slot(&self, name: &str) -> Slot {
        self.lock().entry(name.to_string()).or_default().clone()
    }

    /// Storage name to read for a requested bundle.
    fn storage_name(&self, name: &str) -> String {
        match self.bundle_map.get(name) {
            Some(entry) => entry.storage_name(self.options.use_variant).to_string(),
            None => {
                error!(bundle = %name, "bundle is not listed in the bundle map, loading it by name");
                name.to_string()
            }
        }
    }

    async fn read_bundle(&self, name: &str) -> RuntimeResult<BundleHandle> {
        let storage_name = self.storage_name(name);
        let data = self.store.get(&storage_name).await?;
        let handle = self.reader.read(&storage_name, data)?;
        debug!(bundle = %name, storage = %storage_name, "loaded bundle");
        Ok(handle)
    }

    /// Load one bundle, without its dependencies.
    async fn load_single(&self, slot: &BundleSlot, name: &str) -> RuntimeResult<BundleHandle> {
        slot.handle
            .get_or_try_init(|| self.read_bundle(name))
            .await
            .cloned()
    }

    /// Load a bundle and every bundle it transitively depends on.
    ///
    /// The bundle itself is cached before its dependencies are requested. If a
    /// dependency fails the bundle stays cached and the error is returned; a
    /// later call retries only the dependencies. Once the whole closure has
    /// loaded, further calls return the cached handle without touching storage.
    #[instrument(skip(self))]
    pub async fn load_bundle(&self, name: &str) -> RuntimeResult<BundleHandle> {
        let slot = self.slot(name);
        if let Some(handle) = slot.handle.get()
            && slot.closure_loaded.load(Ordering::Acquire)
        {
            return Ok(handle.clone());
        }

        let handle = self.load_single(&slot, name).await?;
        if !self.manifest.contains(name) {
            debug!(bundle = %name, "bundle has no manifest entry, loading without dependencies");
        }
        let dependencies = self.manifest.all_dependencies(name);
        try_join_all(dependencies.iter().map(|dep| async move {
            let dep_slot = self.slot(dep);
            self.load_single(&dep_slot, dep).await
        }))
        .await?;
        slot.closure_loaded.store(true, Ordering::Release);
        Ok(handle)
    }

    /// Raw bytes of an asset.
    pub async fn load_asset(&self, bundle: &str, asset: &str) -> RuntimeResult<Bytes> {
        let handle = self.load_bundle(bundle).await?;
        handle
            .asset(asset)
            .ok_or_else(|| RuntimeError::AssetNotFound {
                bundle: bundle.to_string(),
                asset: asset.to_string(),
            })
    }

    /// An asset decoded from JSON.
    pub async fn load_typed_asset<T: DeserializeOwned>(
        &self,
        bundle: &str,
        asset: &str,
    ) -> RuntimeResult<T> {
        let data = self.load_asset(bundle, asset).await?;
        serde_json::from_slice(&data).map_err(|source| RuntimeError::Decode {
            bundle: bundle.to_string(),
            asset: asset.to_string(),
            source,
        })
    }

    /// Cache an externally loaded handle. Fails without touching the cache if
    /// the name is already loaded.
    pub fn insert(&self, name: &str, handle: BundleHandle) -> RuntimeResult<()> {
        let slot = self.slot(name);
        slot.handle.set(handle).map_err(|_| {
            error!(bundle = %name, "bundle loaded twice");
            RuntimeError::DoubleLoad(name.to_string())
        })
    }

    /// Drop every cached handle. Handles and assets held by callers stay valid.
    pub fn unload_all(&self) {
        let removed = {
            let mut slots = self.lock();
            let removed = slots.len();
            slots.clear();
            removed
        };
        info!(removed, "unloaded all bundles");
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.lock().get(name).is_some_and(|slot| slot.initialized())
    }

    /// Sorted names of loaded bundles.
    pub fn loaded_bundles(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .lock()
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn bundle_map(&self) -> &BundleMap {
        &self.bundle_map
    }

    pub fn manifest(&self) -> &DependencyManifest {
        &self.manifest
    }

    pub fn options(&self) -> CacheOptions {
        self.options
    }
}

async fn read_infrastructure(
    store: &dyn ObjectStore,
    reader: &dyn ArchiveReader,
    bundle: &str,
    asset: &str,
) -> RuntimeResult<Bytes> {
    let data = store.get(bundle).await?;
    reader
        .read(bundle, data)?
        .asset(asset)
        .ok_or_else(|| RuntimeError::AssetNotFound {
            bundle: bundle.to_string(),
            asset: asset.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{DocumentReader, LoadedArchive};
    use satchel_core::{ArchiveDocument, ArchiveFormat, ArchivedAsset, BundleMapEntry};
    use satchel_storage::MemoryBackend;
    use std::collections::BTreeMap;

    fn archive(bundle: &str, assets: &[(&str, &str)]) -> Bytes {
        let mut document = ArchiveDocument::new(bundle, ArchiveFormat::Default);
        for (name, data) in assets {
            document
                .insert(*name, ArchivedAsset::new(format!("{bundle}/{name}"), data.as_bytes()))
                .unwrap();
        }
        document.to_bytes().unwrap()
    }

    fn cache(options: CacheOptions) -> BundleCache {
        let store = MemoryBackend::with_objects([
            ("ui", archive("ui", &[("menu", "\"base\"")])),
            ("astc_ui", archive("ui", &[("menu", "\"variant\"")])),
            ("shared", archive("shared", &[("font", "{}")])),
        ]);
        let mut manifest = DependencyManifest::new();
        manifest.insert("ui", ["shared"]);
        manifest.insert("shared", Vec::<String>::new());

        let mut map = BundleMap::new();
        let mut ui = BundleMapEntry::new("ui", "ui");
        ui.set_variant("astc_ui");
        map.push(ui).unwrap();
        map.push(BundleMapEntry::new("shared", "shared")).unwrap();

        BundleCache::new(
            Arc::new(store),
            Arc::new(DocumentReader),
            manifest,
            map,
            options,
        )
    }

    #[tokio::test]
    async fn test_load_bundle_pulls_dependencies() {
        let cache = cache(CacheOptions::default());
        let handle = cache.load_bundle("ui").await.unwrap();

        assert_eq!(handle.name(), "ui");
        assert_eq!(cache.loaded_bundles(), vec!["shared", "ui"]);
    }

    #[tokio::test]
    async fn test_variant_substitution() {
        let cache = cache(CacheOptions { use_variant: true });
        let menu: String = cache.load_typed_asset("ui", "menu").await.unwrap();
        assert_eq!(menu, "variant");

        let cache = self::cache(CacheOptions::default());
        let menu: String = cache.load_typed_asset("ui", "menu").await.unwrap();
        assert_eq!(menu, "base");
    }

    #[tokio::test]
    async fn test_missing_asset_and_bundle() {
        let cache = cache(CacheOptions::default());

        let err = cache.load_asset("ui", "nope").await.unwrap_err();
        assert!(matches!(err, RuntimeError::AssetNotFound { .. }));
        assert!(err.is_not_found());

        let err = cache.load_bundle("unknown").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(!cache.is_loaded("unknown"));
    }

    #[tokio::test]
    async fn test_typed_asset_decode_error() {
        let cache = cache(CacheOptions::default());
        let err = cache
            .load_typed_asset::<Vec<u32>>("shared", "font")
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_insert_rejects_double_load() {
        let cache = cache(CacheOptions::default());
        let original = cache.load_bundle("shared").await.unwrap();

        let other: BundleHandle = Arc::new(LoadedArchive::new("shared", BTreeMap::new()));
        let err = cache.insert("shared", other).unwrap_err();
        assert!(matches!(err, RuntimeError::DoubleLoad(name) if name == "shared"));

        let cached = cache.load_bundle("shared").await.unwrap();
        assert!(Arc::ptr_eq(&original, &cached));
    }

    #[tokio::test]
    async fn test_unload_all_keeps_extracted_assets() {
        let cache = cache(CacheOptions::default());
        let menu = cache.load_asset("ui", "menu").await.unwrap();

        cache.unload_all();

        assert!(cache.loaded_bundles().is_empty());
        assert!(!cache.is_loaded("ui"));
        assert_eq!(menu, Bytes::from_static(b"\"base\""));
    }
}
