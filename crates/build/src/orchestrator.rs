//! Two-pass build driver.

use crate::archiver::{ArchiveRequest, Archiver};
use crate::emitter::EmittedResources;
use crate::error::BuildResult;
use crate::plan::BuildPlan;
use satchel_core::config::BuildConfig;
use satchel_core::{ArchiveFormat, MANIFEST_BUNDLE_NAME, sidecar_name, variant_bundle_name};
use satchel_storage::ObjectStore;
use satchel_storage::traits::directory_prefix;
use tracing::{debug, info, instrument};

/// Storage names written to the output store by one build.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Base archives, plus the renamed dependency manifest.
    pub base_bundles: Vec<String>,
    /// Variant archives at their final names.
    pub variant_bundles: Vec<String>,
}

pub struct Orchestrator<'a> {
    output: &'a dyn ObjectStore,
    archiver: &'a dyn Archiver,
    config: &'a BuildConfig,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        output: &'a dyn ObjectStore,
        archiver: &'a dyn Archiver,
        config: &'a BuildConfig,
    ) -> Self {
        Self {
            output,
            archiver,
            config,
        }
    }

    /// Run the base pass then the variant pass.
    #[instrument(skip_all, fields(backend = self.output.backend_name()))]
    pub async fn run(
        &self,
        plan: &BuildPlan,
        resources: &EmittedResources,
    ) -> BuildResult<BuildReport> {
        if self.config.clean_output {
            let removed = self.output.delete_prefix("").await?;
            debug!(removed, "cleaned output");
        }

        let mut report = BuildReport {
            base_bundles: self.base_pass(plan, resources).await?,
            ..BuildReport::default()
        };
        report.variant_bundles = self.variant_pass(plan).await?;

        info!(
            base = report.base_bundles.len(),
            variants = report.variant_bundles.len(),
            "build complete"
        );
        Ok(report)
    }

    async fn base_pass(
        &self,
        plan: &BuildPlan,
        resources: &EmittedResources,
    ) -> BuildResult<Vec<String>> {
        let builds = plan.base_builds(resources);
        let output = self
            .archiver
            .build(ArchiveRequest {
                output_prefix: "",
                builds: &builds,
                format: ArchiveFormat::Default,
            })
            .await?;

        if output.manifest_key != MANIFEST_BUNDLE_NAME {
            self.output
                .rename(&output.manifest_key, MANIFEST_BUNDLE_NAME)
                .await?;
            self.output
                .rename(
                    &sidecar_name(&output.manifest_key),
                    &sidecar_name(MANIFEST_BUNDLE_NAME),
                )
                .await?;
            debug!(from = %output.manifest_key, "renamed dependency manifest");
        }

        let mut bundles = output.bundles;
        bundles.push(MANIFEST_BUNDLE_NAME.to_string());
        Ok(bundles)
    }

    async fn variant_pass(&self, plan: &BuildPlan) -> BuildResult<Vec<String>> {
        let builds = plan.variant_builds();
        if builds.is_empty() {
            return Ok(Vec::new());
        }

        let scratch = directory_prefix(&self.config.variant_scratch_dir);
        let stale = self.output.delete_prefix(&scratch).await?;
        if stale > 0 {
            debug!(stale, "removed stale variant scratch directory");
        }

        let output = self
            .archiver
            .build(ArchiveRequest {
                output_prefix: &scratch,
                builds: &builds,
                format: ArchiveFormat::Variant,
            })
            .await?;

        let mut finals = Vec::with_capacity(output.bundles.len());
        for name in &output.bundles {
            let target = variant_bundle_name(&self.config.variant_prefix, name);
            let source = format!("{scratch}{name}");
            self.output.copy(&source, &target).await?;
            self.output
                .copy(&sidecar_name(&source), &sidecar_name(&target))
                .await?;
            debug!(bundle = %name, target = %target, "placed variant bundle");
            finals.push(target);
        }

        self.output.delete_prefix(&scratch).await?;
        Ok(finals)
    }
}
