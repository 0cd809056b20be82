//! Capabilities the pipeline consumes from the host content system.

use crate::error::BuildResult;

/// Content type reported for files the source knows nothing special about.
pub const DEFAULT_CONTENT_TYPE: &str = "asset";

/// Dependency introspection: which files does a file reference?
pub trait DependencySource: Send + Sync {
    /// Every file `path` references, resolved transitively.
    ///
    /// The result may include `path` itself; the collector ignores primary
    /// assets anyway.
    fn dependencies(&self, path: &str) -> BuildResult<Vec<String>>;

    /// Main content type of a file, matched against the exclusion set.
    fn content_type(&self, path: &str) -> BuildResult<String>;
}

/// Per-asset inspection deciding which assets need a variant build.
pub trait VariantInspector: Send + Sync {
    /// The atlas packing tag of an asset, if it has one.
    fn packing_tag(&self, path: &str) -> BuildResult<Option<String>>;

    /// Whether the asset participates in packing and so needs a variant.
    fn requires_variant(&self, path: &str) -> BuildResult<bool> {
        Ok(self
            .packing_tag(path)?
            .is_some_and(|tag| !tag.trim().is_empty()))
    }
}

/// An inspector that never requests variants.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoVariants;

impl VariantInspector for NoVariants {
    fn packing_tag(&self, _path: &str) -> BuildResult<Option<String>> {
        Ok(None)
    }
}
