//! Group registry: the user-declared groups of one build.

use crate::error::{BuildError, BuildResult};
use satchel_core::config::GroupConfig;
use satchel_core::content::normalize_source_path;
use satchel_core::{ContentReference, Group};
use satchel_storage::ObjectStore;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Ordered set of groups with unique names.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: Vec<Group>,
    names: HashSet<String>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group. The name is lower-cased.
    pub fn add_group(
        &mut self,
        name: impl AsRef<str>,
        members: Vec<ContentReference>,
    ) -> BuildResult<&Group> {
        let group = Group::new(name, members)?;
        if !self.names.insert(group.name().to_string()) {
            return Err(BuildError::DuplicateGroup(group.name().to_string()));
        }
        if group.members().is_empty() {
            warn!(group = %group.name(), "group has no members");
        }
        debug!(group = %group.name(), members = group.members().len(), "registered group");
        self.groups.push(group);
        Ok(&self.groups[self.groups.len() - 1])
    }

    /// One group holding a single file, named `prefix + file stem`.
    pub fn add_file_group(&mut self, path: &str, prefix: &str) -> BuildResult<&Group> {
        let reference = ContentReference::new(path)?;
        let name = format!("{prefix}{}", reference.logical_name());
        self.add_group(name, vec![reference])
    }

    /// One single-file group per file under `dir` with the given extension.
    /// Returns the number of groups added.
    pub async fn add_file_groups(
        &mut self,
        store: &dyn ObjectStore,
        dir: &str,
        extension: &str,
        prefix: &str,
    ) -> BuildResult<usize> {
        let extension = format!(".{}", extension.trim_start_matches('.'));
        let mut added = 0;
        for key in store.list(&normalize_source_path(dir)).await? {
            if key.ends_with(&extension) {
                self.add_file_group(&key, prefix)?;
                added += 1;
            }
        }
        Ok(added)
    }

    /// One group named `prefix + directory name` holding every file under
    /// `dir` whose name ends with `suffix`.
    pub async fn add_dir_group(
        &mut self,
        store: &dyn ObjectStore,
        dir: &str,
        suffix: &str,
        prefix: &str,
    ) -> BuildResult<&Group> {
        let dir = normalize_source_path(dir);
        let dir = dir.trim_end_matches('/');
        let dir_name = dir.rsplit('/').next().unwrap_or(dir);
        let members = store
            .list(dir)
            .await?
            .into_iter()
            .filter(|key| key.ends_with(suffix))
            .map(ContentReference::new)
            .collect::<satchel_core::Result<Vec<_>>>()?;
        self.add_group(format!("{prefix}{dir_name}"), members)
    }

    /// Register every configured group, in order.
    pub async fn apply_config(
        &mut self,
        store: &dyn ObjectStore,
        groups: &[GroupConfig],
    ) -> BuildResult<()> {
        for group in groups {
            match group {
                GroupConfig::File { path, prefix } => {
                    self.add_file_group(path, prefix)?;
                }
                GroupConfig::Files {
                    dir,
                    extension,
                    prefix,
                } => {
                    let added = self.add_file_groups(store, dir, extension, prefix).await?;
                    if added == 0 {
                        warn!(dir = %dir, extension = %extension, "no files matched");
                    }
                }
                GroupConfig::Directory {
                    dir,
                    suffix,
                    prefix,
                } => {
                    self.add_dir_group(store, dir, suffix, prefix).await?;
                }
            }
        }
        Ok(())
    }

    /// Groups in registration order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn get(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name() == name)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
