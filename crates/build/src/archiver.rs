//! The archive builder seam.

use crate::error::BuildResult;
use async_trait::async_trait;
use satchel_core::ArchiveFormat;

/// One source file going into an archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildInput {
    pub source_path: String,
    /// Name the asset is extracted by at runtime.
    pub logical_name: String,
}

impl BuildInput {
    pub fn new(source_path: impl Into<String>, logical_name: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            logical_name: logical_name.into(),
        }
    }
}

/// One archive to produce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BundleBuild {
    /// Logical bundle name, recorded in the dependency manifest.
    pub bundle_name: String,
    /// File name of the archive inside the output prefix.
    pub storage_name: String,
    pub inputs: Vec<BuildInput>,
}

#[derive(Clone, Copy, Debug)]
pub struct ArchiveRequest<'a> {
    /// Output directory within the output store: `""` or `"dir/"`.
    pub output_prefix: &'a str,
    pub builds: &'a [BundleBuild],
    pub format: ArchiveFormat,
}

/// What an archive pass wrote, relative to its output prefix.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArchiveOutput {
    /// Storage name of the dependency manifest artifact.
    pub manifest_key: String,
    /// Storage names of the produced bundles, in build order.
    pub bundles: Vec<String>,
}

/// Builds archive units from source files.
///
/// Every bundle is written with a `.manifest` side-car, and every pass also
/// writes a dependency manifest artifact named after the output directory.
#[async_trait]
pub trait Archiver: Send + Sync {
    async fn build(&self, request: ArchiveRequest<'_>) -> BuildResult<ArchiveOutput>;
}
