//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage.
    Filesystem {
        /// Root directory for storage.
        path: PathBuf,
    },
    /// In-process storage, lost on exit. Intended for tests and dry runs.
    Memory,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Filesystem {
            path: PathBuf::from("."),
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            StorageConfig::Filesystem { path } if path.as_os_str().is_empty() => {
                Err("filesystem storage requires a non-empty path".to_string())
            }
            _ => Ok(()),
        }
    }

    /// Last path component of a filesystem root, if any.
    pub fn directory_name(&self) -> Option<String> {
        match self {
            StorageConfig::Filesystem { path } => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            StorageConfig::Memory => None,
        }
    }
}

/// How a group is declared.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GroupConfig {
    /// One group holding a single file, named `prefix + file stem`.
    File {
        path: String,
        #[serde(default)]
        prefix: String,
    },
    /// One single-file group per file under `dir` with the given extension.
    Files {
        dir: String,
        extension: String,
        #[serde(default)]
        prefix: String,
    },
    /// One group holding every file under `dir` whose name ends with
    /// `suffix`, named `prefix + directory name`.
    Directory {
        dir: String,
        #[serde(default)]
        suffix: String,
        #[serde(default)]
        prefix: String,
    },
}

/// Build pipeline configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Store bundles under a digest of their name instead of the name.
    #[serde(default)]
    pub obfuscate_bundle_names: bool,
    /// Prefix of variant bundle names (default: "astc_").
    #[serde(default = "default_variant_prefix")]
    pub variant_prefix: String,
    /// Scratch subdirectory of the output used by the variant pass.
    #[serde(default = "default_variant_scratch_dir")]
    pub variant_scratch_dir: String,
    /// Content types never packed into shared groups (default: ["script"]).
    #[serde(default = "default_excluded_content_types")]
    pub excluded_content_types: Vec<String>,
    /// Remove everything in the output store before building (default: true).
    #[serde(default = "default_clean_output")]
    pub clean_output: bool,
    /// Directory in the source store receiving the emitted map resources.
    #[serde(default = "default_generated_dir")]
    pub generated_dir: String,
    /// Declared groups, in build order.
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
}

fn default_variant_prefix() -> String {
    crate::bundle::DEFAULT_VARIANT_PREFIX.to_string()
}

fn default_variant_scratch_dir() -> String {
    "variant".to_string()
}

fn default_excluded_content_types() -> Vec<String> {
    vec!["script".to_string()]
}

fn default_clean_output() -> bool {
    true
}

fn default_generated_dir() -> String {
    "generated".to_string()
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            obfuscate_bundle_names: false,
            variant_prefix: default_variant_prefix(),
            variant_scratch_dir: default_variant_scratch_dir(),
            excluded_content_types: default_excluded_content_types(),
            clean_output: default_clean_output(),
            generated_dir: default_generated_dir(),
            groups: Vec::new(),
        }
    }
}

impl BuildConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.variant_prefix.is_empty() {
            return Err("build.variant_prefix cannot be empty: variant and base \
                 bundles would share storage names"
                .to_string());
        }
        crate::content::validate_bundle_name(&self.variant_scratch_dir)
            .map_err(|e| format!("build.variant_scratch_dir: {e}"))?;
        if self.generated_dir.is_empty() || self.generated_dir.contains("..") {
            return Err(format!(
                "build.generated_dir must be a relative directory, got {:?}",
                self.generated_dir
            ));
        }
        Ok(())
    }
}

/// Runtime cache configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Prefer variant bundles where the bundle map lists one.
    #[serde(default)]
    pub use_variant: bool,
}

/// Complete application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where source content is read from.
    #[serde(default)]
    pub source: StorageConfig,
    /// Where bundles are written to and loaded from.
    #[serde(default = "default_output")]
    pub output: StorageConfig,
    /// Key of the asset catalog within the source store.
    #[serde(default = "default_catalog")]
    pub catalog: String,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

fn default_output() -> StorageConfig {
    StorageConfig::Filesystem {
        path: PathBuf::from("./bundles"),
    }
}

fn default_catalog() -> String {
    "catalog.json".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: StorageConfig::default(),
            output: default_output(),
            catalog: default_catalog(),
            build: BuildConfig::default(),
            runtime: RuntimeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Create a test configuration backed by in-memory stores.
    ///
    /// **For testing only.**
    pub fn for_testing() -> Self {
        Self {
            source: StorageConfig::Memory,
            output: StorageConfig::Memory,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.source.validate()?;
        self.output.validate()?;
        self.build.validate()?;
        if let (
            StorageConfig::Filesystem { path: source },
            StorageConfig::Filesystem { path: output },
        ) = (&self.source, &self.output)
            && source == output
            && self.build.clean_output
        {
            return Err(
                "output storage equals source storage while build.clean_output is set; \
                 the build would delete its own sources"
                    .to_string(),
            );
        }
        Ok(())
    }

    /// Name the archiver gives the dependency manifest artifact.
    pub fn output_name(&self) -> String {
        self.output
            .directory_name()
            .unwrap_or_else(|| "bundles".to_string())
    }
}
