//! End-to-end build with the reference collaborators.

use crate::catalog::AssetCatalog;
use crate::document::DocumentArchiver;
use crate::emitter;
use crate::error::BuildResult;
use crate::orchestrator::{BuildReport, Orchestrator};
use crate::plan::BuildPlan;
use crate::registry::GroupRegistry;
use satchel_core::config::AppConfig;
use satchel_storage::ObjectStore;
use std::sync::Arc;
use tracing::{info, instrument};

/// Result of a full build.
#[derive(Debug)]
pub struct BuildOutcome {
    pub plan: BuildPlan,
    pub report: BuildReport,
}

/// Load the catalog, register the configured groups and analyze them.
#[instrument(skip_all)]
pub async fn plan(
    config: &AppConfig,
    source: &dyn ObjectStore,
) -> BuildResult<(BuildPlan, AssetCatalog)> {
    let catalog = AssetCatalog::load(source, &config.catalog).await?;
    let mut registry = GroupRegistry::new();
    registry.apply_config(source, &config.build.groups).await?;
    let plan = BuildPlan::analyze(registry.groups(), &catalog, &catalog, &config.build)?;
    Ok((plan, catalog))
}

/// Plan, emit the maps and run both archive passes.
#[instrument(skip_all, fields(source = source.backend_name(), output = output.backend_name()))]
pub async fn run(
    config: &AppConfig,
    source: Arc<dyn ObjectStore>,
    output: Arc<dyn ObjectStore>,
) -> BuildResult<BuildOutcome> {
    let (plan, catalog) = plan(config, source.as_ref()).await?;
    let resources = emitter::emit(source.as_ref(), &config.build.generated_dir, &plan).await?;

    let archiver = DocumentArchiver::new(
        source.clone(),
        output.clone(),
        Arc::new(catalog),
        config.output_name(),
    );
    let report = Orchestrator::new(output.as_ref(), &archiver, &config.build)
        .run(&plan, &resources)
        .await?;

    info!(bundles = plan.bundle_map.len(), "pipeline finished");
    Ok(BuildOutcome { plan, report })
}
