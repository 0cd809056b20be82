//! Reference archiver writing [`ArchiveDocument`]s.

use crate::archiver::{ArchiveOutput, ArchiveRequest, Archiver};
use crate::error::{BuildError, BuildResult};
use crate::source::DependencySource;
use async_trait::async_trait;
use bytes::Bytes;
use satchel_core::{
    ArchiveDocument, ArchiveFormat, ArchiveSidecar, ArchivedAsset, DependencyManifest,
    MANIFEST_ASSET_NAME, sidecar_name,
};
use satchel_storage::ObjectStore;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Packages source files into JSON archive documents.
pub struct DocumentArchiver {
    sources: Arc<dyn ObjectStore>,
    output: Arc<dyn ObjectStore>,
    dependencies: Arc<dyn DependencySource>,
    root_name: String,
}

impl DocumentArchiver {
    /// `root_name` names the manifest artifact of passes writing to the
    /// output root.
    pub fn new(
        sources: Arc<dyn ObjectStore>,
        output: Arc<dyn ObjectStore>,
        dependencies: Arc<dyn DependencySource>,
        root_name: impl Into<String>,
    ) -> Self {
        Self {
            sources,
            output,
            dependencies,
            root_name: root_name.into(),
        }
    }

    /// Name of the manifest artifact: the last component of the output
    /// directory.
    fn manifest_name(&self, output_prefix: &str) -> String {
        let dir = output_prefix.trim_end_matches('/');
        if dir.is_empty() {
            self.root_name.clone()
        } else {
            dir.rsplit('/').next().unwrap_or(dir).to_string()
        }
    }

    async fn write(
        &self,
        key: &str,
        document: &ArchiveDocument,
        dependencies: Vec<String>,
    ) -> BuildResult<()> {
        let sidecar = ArchiveSidecar {
            bundle_name: document.bundle_name.clone(),
            format: document.format,
            assets: document.assets.keys().cloned().collect(),
            dependencies,
        };
        self.output.put(key, document.to_bytes()?).await?;
        self.output
            .put(&sidecar_name(key), sidecar.to_bytes()?)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Archiver for DocumentArchiver {
    #[instrument(skip_all, fields(prefix = request.output_prefix, builds = request.builds.len()))]
    async fn build(&self, request: ArchiveRequest<'_>) -> BuildResult<ArchiveOutput> {
        let manifest_name = self.manifest_name(request.output_prefix);

        let mut owners: HashMap<&str, &str> = HashMap::new();
        for build in request.builds {
            if build.storage_name == manifest_name {
                return Err(BuildError::Archive(format!(
                    "bundle {} would overwrite the manifest artifact {manifest_name}",
                    build.bundle_name
                )));
            }
            for input in &build.inputs {
                owners.insert(&input.source_path, &build.bundle_name);
            }
        }

        let mut manifest = DependencyManifest::new();
        let mut bundles = Vec::with_capacity(request.builds.len());

        for build in request.builds {
            let mut document = ArchiveDocument::new(&build.bundle_name, request.format);
            let mut dependencies = BTreeSet::new();

            for input in &build.inputs {
                let data = self.sources.get(&input.source_path).await?;
                document.insert(
                    &input.logical_name,
                    ArchivedAsset::new(&input.source_path, &data),
                )?;
                for referenced in self.dependencies.dependencies(&input.source_path)? {
                    if let Some(&owner) = owners.get(referenced.as_str())
                        && owner != build.bundle_name
                    {
                        dependencies.insert(owner.to_string());
                    }
                }
            }

            let dependencies: Vec<String> = dependencies.into_iter().collect();
            let key = format!("{}{}", request.output_prefix, build.storage_name);
            self.write(&key, &document, dependencies.clone()).await?;
            debug!(bundle = %build.bundle_name, key = %key, deps = dependencies.len(), "archived bundle");

            manifest.insert(&build.bundle_name, dependencies);
            bundles.push(build.storage_name.clone());
        }

        let mut document = ArchiveDocument::new(&manifest_name, ArchiveFormat::Default);
        document.insert(
            MANIFEST_ASSET_NAME,
            ArchivedAsset::new(MANIFEST_ASSET_NAME, &manifest.to_json()?),
        )?;
        let key = format!("{}{manifest_name}", request.output_prefix);
        self.write(&key, &document, Vec::new()).await?;

        info!(bundles = bundles.len(), manifest = %key, "archive pass complete");
        Ok(ArchiveOutput {
            manifest_key: manifest_name,
            bundles,
        })
    }
}

/// Decode the dependency manifest from a manifest artifact.
pub fn read_manifest(data: &Bytes) -> BuildResult<DependencyManifest> {
    let document = ArchiveDocument::from_bytes(data)?;
    let asset = document.assets.get(MANIFEST_ASSET_NAME).ok_or_else(|| {
        BuildError::Archive(format!(
            "archive {} holds no {MANIFEST_ASSET_NAME} asset",
            document.bundle_name
        ))
    })?;
    Ok(DependencyManifest::from_json(&asset.decode()?)?)
}
