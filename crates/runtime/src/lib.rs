//! Runtime half of Satchel: loading built bundles on demand.
//!
//! A [`BundleCache`] resolves a logical bundle name through the bundle map,
//! optionally substituting the variant archive, reads it through an
//! [`ArchiveReader`] and then loads the bundles the dependency manifest lists
//! for it.

pub mod cache;
pub mod error;
pub mod reader;

pub use cache::{BundleCache, CacheOptions};
pub use error::{RuntimeError, RuntimeResult};
pub use reader::{Archive, ArchiveReader, BundleHandle, DocumentReader, LoadedArchive};
