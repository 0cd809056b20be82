//! Core domain types and shared logic for Satchel.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Content references and groups
//! - Shared-group keys and bundle naming
//! - Bundle map, asset map and variant groups
//! - The dependency manifest
//! - The reference archive document
//! - Configuration

pub mod archive;
pub mod bundle;
pub mod config;
pub mod content;
pub mod error;
pub mod hash;
pub mod manifest;
pub mod maps;

pub use archive::{ArchiveDocument, ArchiveFormat, ArchiveSidecar, ArchivedAsset};
pub use bundle::{SharedGroupKey, real_bundle_name, sidecar_name, variant_bundle_name};
pub use content::{ContentReference, Group};
pub use error::{Error, Result};
pub use hash::ContentHash;
pub use manifest::DependencyManifest;
pub use maps::{
    AssetMap, AssetMapEntry, AtlasBundleMap, BuildRecord, BundleMap, BundleMapEntry, VariantGroup,
};

/// Bundle holding the dependency manifest.
pub const MANIFEST_BUNDLE_NAME: &str = "manifest";

/// Logical name of the manifest asset inside its bundle.
pub const MANIFEST_ASSET_NAME: &str = "manifest";

/// Bundle holding the bundle map.
pub const BUNDLE_MAP_BUNDLE_NAME: &str = "bundlemap";

/// Logical name of the bundle map asset.
pub const BUNDLE_MAP_ASSET_NAME: &str = "bundle_map";

/// Bundle holding the asset map and the atlas bundle map.
pub const ASSET_MAP_BUNDLE_NAME: &str = "assetmap";

/// Logical name of the asset map asset.
pub const ASSET_MAP_ASSET_NAME: &str = "asset_map";

/// Logical name of the atlas bundle map asset.
pub const ATLAS_BUNDLE_MAP_ASSET_NAME: &str = "atlas_bundle_map";

/// Infrastructure bundles present in every build, in bundle map order.
pub const INFRASTRUCTURE_BUNDLES: [&str; 3] = [
    MANIFEST_BUNDLE_NAME,
    ASSET_MAP_BUNDLE_NAME,
    BUNDLE_MAP_BUNDLE_NAME,
];
