//! Build-time half of Satchel.
//!
//! Groups declared by the host are walked through an injected
//! [`DependencySource`]; files referenced by groups are hoisted into shared
//! groups named by a digest of their owners. The resulting [`BuildPlan`]
//! feeds an [`Archiver`] twice: once with default format settings and once
//! for bundles that need a format-substituted variant.

pub mod archiver;
pub mod catalog;
pub mod collector;
pub mod document;
pub mod emitter;
pub mod error;
pub mod orchestrator;
pub mod pipeline;
pub mod plan;
pub mod registry;
pub mod source;
pub mod synthesizer;
pub mod variant;

pub use archiver::{ArchiveOutput, ArchiveRequest, Archiver, BuildInput, BundleBuild};
pub use catalog::{AssetCatalog, CatalogEntry};
pub use collector::{Collection, DependencyCollector, ReverseDependencyIndex};
pub use document::{DocumentArchiver, read_manifest};
pub use emitter::{EmittedResources, emit};
pub use error::{BuildError, BuildResult};
pub use orchestrator::{BuildReport, Orchestrator};
pub use plan::BuildPlan;
pub use registry::GroupRegistry;
pub use source::{DEFAULT_CONTENT_TYPE, DependencySource, NoVariants, VariantInspector};
pub use synthesizer::{SharedGroup, Synthesis, synthesize};
