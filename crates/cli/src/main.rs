//! Command-line entry point for Satchel.

use anyhow::{Context, Result};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use satchel_build::{BuildPlan, pipeline};
use satchel_core::config::AppConfig;
use satchel_runtime::{BundleCache, CacheOptions, DocumentReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Satchel - content bundle builder and loader
#[derive(Parser, Debug)]
#[command(name = "satchel")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "SATCHEL_CONFIG", default_value = "satchel.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze the configured groups and print the bundle map
    Plan,
    /// Build every bundle into the output store
    Build,
    /// Load a bundle and its dependencies, printing its assets and every loaded bundle
    Load {
        bundle: String,
        /// Prefer variant bundles (overrides runtime.use_variant)
        #[arg(long, default_value_t = false)]
        variant: bool,
    },
    /// Write one asset of a bundle to a file or stdout
    Extract {
        bundle: String,
        asset: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        variant: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Plan => {
            let plan = plan(&config).await?;
            let json = plan.bundle_map.to_json()?;
            println!("{}", String::from_utf8_lossy(&json));
        }
        Commands::Build => {
            let outcome = build(&config).await?;
            for name in outcome
                .report
                .base_bundles
                .iter()
                .chain(&outcome.report.variant_bundles)
            {
                println!("{name}");
            }
        }
        Commands::Load { bundle, variant } => {
            let loaded = load(&config, &bundle, variant).await?;
            println!("assets of {bundle}:");
            for asset in &loaded.assets {
                println!("  {asset}");
            }
            println!("loaded bundles:");
            for name in &loaded.bundles {
                println!("  {name}");
            }
        }
        Commands::Extract {
            bundle,
            asset,
            out,
            variant,
        } => {
            let data = extract(&config, &bundle, &asset, variant).await?;
            match out {
                Some(path) => tokio::fs::write(&path, &data)
                    .await
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => {
                    let mut stdout = tokio::io::stdout();
                    stdout.write_all(&data).await?;
                    stdout.flush().await?;
                }
            }
        }
    }

    Ok(())
}

/// Merge the config file (if present) with `SATCHEL_` environment variables.
fn load_config(path: &Path) -> Result<AppConfig> {
    let mut figment = Figment::new();
    let has_config_file = path.exists();

    if has_config_file {
        tracing::info!(config_path = %path.display(), "Loading configuration from file");
        figment = figment.merge(Toml::file(path));
    } else {
        tracing::debug!("No config file found at {}", path.display());
    }

    let has_env_config =
        std::env::vars().any(|(key, _)| key.starts_with("SATCHEL_") && key != "SATCHEL_CONFIG");

    if !has_config_file && !has_env_config {
        anyhow::bail!(
            "No configuration provided.\n\n\
             Provide configuration via one of:\n  \
             1. Config file: satchel --config /path/to/satchel.toml <command>\n  \
             2. Environment variables: SATCHEL_SOURCE__TYPE=filesystem \
             SATCHEL_SOURCE__PATH=./content satchel <command>\n\n\
             Set SATCHEL_CONFIG env var to specify a default config file path."
        );
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("SATCHEL_").split("__"))
        .extract()
        .context("failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;
    Ok(config)
}

async fn plan(config: &AppConfig) -> Result<BuildPlan> {
    let source = satchel_storage::from_config(&config.source)
        .await
        .context("failed to open source storage")?;
    let (plan, _) = pipeline::plan(config, source.as_ref())
        .await
        .context("build analysis failed")?;
    Ok(plan)
}

async fn build(config: &AppConfig) -> Result<pipeline::BuildOutcome> {
    let source = satchel_storage::from_config(&config.source)
        .await
        .context("failed to open source storage")?;
    let output = satchel_storage::from_config(&config.output)
        .await
        .context("failed to open output storage")?;
    output
        .health_check()
        .await
        .context("output storage health check failed")?;

    let outcome = pipeline::run(config, source, output)
        .await
        .context("build failed")?;
    tracing::info!(
        bundles = outcome.plan.bundle_map.len(),
        variants = outcome.report.variant_bundles.len(),
        "Build finished"
    );
    Ok(outcome)
}

async fn open_cache(config: &AppConfig, variant: bool) -> Result<BundleCache> {
    let output = satchel_storage::from_config(&config.output)
        .await
        .context("failed to open output storage")?;
    let mut options = CacheOptions::from(&config.runtime);
    options.use_variant |= variant;
    let cache = BundleCache::initialize(output, Arc::new(DocumentReader), options)
        .await
        .context("failed to read bundle manifest and bundle map")?;
    tracing::debug!(
        use_variant = cache.options().use_variant,
        "Opened bundle cache"
    );
    Ok(cache)
}

/// Result of the `load` command.
#[derive(Debug)]
struct Loaded {
    /// Assets of the requested bundle.
    assets: Vec<String>,
    /// Every bundle in the cache afterwards, sorted.
    bundles: Vec<String>,
}

async fn load(config: &AppConfig, bundle: &str, variant: bool) -> Result<Loaded> {
    let cache = open_cache(config, variant).await?;
    let handle = cache
        .load_bundle(bundle)
        .await
        .with_context(|| format!("failed to load bundle {bundle}"))?;
    Ok(Loaded {
        assets: handle.asset_names(),
        bundles: cache.loaded_bundles(),
    })
}

async fn extract(config: &AppConfig, bundle: &str, asset: &str, variant: bool) -> Result<Bytes> {
    let cache = open_cache(config, variant).await?;
    cache
        .load_asset(bundle, asset)
        .await
        .with_context(|| format!("failed to extract {asset} from {bundle}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempdir};

    const CATALOG: &str = r#"{
        "assets": [
            { "path": "ui/menu.prefab", "references": ["shared.png"] },
            { "path": "hud/bar.prefab", "references": ["shared.png"] },
            { "path": "shared.png", "packing_tag": "common" }
        ]
    }"#;

    fn write_project() -> (TempDir, PathBuf) {
        let temp = tempdir().unwrap();
        let content = temp.path().join("content");
        for (path, data) in [
            ("ui/menu.prefab", "menu"),
            ("hud/bar.prefab", "bar"),
            ("shared.png", "pixels"),
            ("catalog.json", CATALOG),
        ] {
            let file = content.join(path);
            std::fs::create_dir_all(file.parent().unwrap()).unwrap();
            std::fs::write(file, data).unwrap();
        }

        let config_path = temp.path().join("satchel.toml");
        let toml = format!(
            r#"
catalog = "catalog.json"

[source]
type = "filesystem"
path = "{content}"

[output]
type = "filesystem"
path = "{output}"

[[build.groups]]
type = "directory"
dir = "ui"

[[build.groups]]
type = "directory"
dir = "hud"
"#,
            content = content.display(),
            output = temp.path().join("bundles").display(),
        );
        std::fs::write(&config_path, toml).unwrap();
        (temp, config_path)
    }

    #[test]
    fn load_config_reads_toml() {
        let (_temp, path) = write_project();
        let config = load_config(&path).unwrap();
        assert_eq!(config.build.groups.len(), 2);
        assert_eq!(config.build.variant_prefix, "astc_");
        assert_eq!(config.output_name(), "bundles");
    }

    #[tokio::test]
    async fn plan_lists_groups_and_shared_bundle() {
        let (_temp, path) = write_project();
        let config = load_config(&path).unwrap();
        let plan = plan(&config).await.unwrap();

        assert!(plan.bundle_map.contains("ui"));
        assert!(plan.bundle_map.contains("hud"));
        assert_eq!(plan.shared_groups.len(), 1);
        assert_eq!(plan.variant_groups.len(), 1);
    }

    #[tokio::test]
    async fn build_then_load_and_extract() {
        let (temp, path) = write_project();
        let config = load_config(&path).unwrap();

        let outcome = build(&config).await.unwrap();
        assert_eq!(outcome.report.variant_bundles.len(), 1);
        assert!(temp.path().join("bundles/manifest").is_file());

        let loaded = load(&config, "ui", false).await.unwrap();
        assert_eq!(loaded.assets, ["menu"]);
        assert_eq!(loaded.bundles.len(), 2);
        assert!(loaded.bundles.contains(&"ui".to_string()));

        let data = extract(&config, "hud", "bar", true).await.unwrap();
        assert_eq!(&data[..], b"bar");

        let err = extract(&config, "hud", "missing", false).await.unwrap_err();
        assert!(err.to_string().contains("failed to extract missing from hud"));
    }
}
