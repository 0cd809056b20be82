//! Content references and groups.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one importable source file.
///
/// Paths are normalized to forward slashes so that references created on
/// different hosts compare equal.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentReference {
    source_path: String,
}

impl ContentReference {
    /// Create a reference, normalizing and validating the path.
    pub fn new(source_path: impl Into<String>) -> crate::Result<Self> {
        let source_path = normalize_source_path(&source_path.into());
        if source_path.is_empty() {
            return Err(crate::Error::InvalidSourcePath(
                "source path must not be empty".to_string(),
            ));
        }
        if source_path.ends_with('/') {
            return Err(crate::Error::InvalidSourcePath(format!(
                "source path names a directory: {source_path}"
            )));
        }
        Ok(Self { source_path })
    }

    /// The normalized source path.
    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    /// The name used to look the asset up inside its bundle.
    pub fn logical_name(&self) -> &str {
        file_stem(&self.source_path)
    }
}

impl fmt::Debug for ContentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentReference({})", self.source_path)
    }
}

impl fmt::Display for ContentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source_path)
    }
}

/// A named collection of content destined for one bundle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    name: String,
    members: Vec<ContentReference>,
}

impl Group {
    /// Create a group. The name is lower-cased and validated as a bundle name.
    pub fn new(name: impl AsRef<str>, members: Vec<ContentReference>) -> crate::Result<Self> {
        let name = name.as_ref().to_lowercase();
        validate_bundle_name(&name)?;
        Ok(Self { name, members })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[ContentReference] {
        &self.members
    }
}

/// Replace backslashes with forward slashes and strip a leading `./`.
pub fn normalize_source_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    match path.strip_prefix("./") {
        Some(rest) => rest.to_string(),
        None => path,
    }
}

/// File name without directory and without its last extension.
pub fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

/// Bundle names double as storage keys in a flat directory.
pub fn validate_bundle_name(name: &str) -> crate::Result<()> {
    if name.is_empty() {
        return Err(crate::Error::InvalidBundleName(
            "bundle name must not be empty".to_string(),
        ));
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(crate::Error::InvalidBundleName(format!(
            "bundle name must be a single path component: {name}"
        )));
    }
    if name.ends_with(".manifest") {
        return Err(crate::Error::InvalidBundleName(format!(
            "bundle name collides with side-car naming: {name}"
        )));
    }
    Ok(())
}
