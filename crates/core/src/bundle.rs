//! Bundle naming: synthetic shared-group keys, obfuscated names and variants.

use crate::hash::ContentHash;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of every synthesized shared-group name.
pub const SHARED_GROUP_PREFIX: &str = "depend_";

/// Default prefix of variant bundle names.
pub const DEFAULT_VARIANT_PREFIX: &str = "astc_";

/// Deterministic name of a synthetic shared group.
///
/// Derived from the sorted, deduplicated set of owning group names, so two
/// dependencies owned by the same set of groups always share a key no matter
/// in which order the owners were discovered.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SharedGroupKey(String);

impl SharedGroupKey {
    /// Compute the key for a set of owning groups.
    pub fn compute<I, S>(owners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut owners: Vec<String> = owners
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        owners.sort();
        owners.dedup();
        let digest = ContentHash::of_str(&owners.join(","));
        Self(format!("{SHARED_GROUP_PREFIX}{}", digest.to_hex()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// A key is valid when it carries a non-empty digest after the prefix.
    pub fn is_valid(&self) -> bool {
        self.0
            .strip_prefix(SHARED_GROUP_PREFIX)
            .is_some_and(|digest| !digest.is_empty() && digest.bytes().all(|b| b.is_ascii_hexdigit()))
    }
}

impl fmt::Debug for SharedGroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedGroupKey({})", self.0)
    }
}

impl fmt::Display for SharedGroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The storage name of a bundle: the bundle name itself, or its digest when
/// obfuscation is enabled.
pub fn real_bundle_name(bundle_name: &str, obfuscate: bool) -> String {
    if obfuscate {
        ContentHash::of_str(bundle_name).to_hex()
    } else {
        bundle_name.to_string()
    }
}

/// Variant bundles are stored as `prefix + bundle name`.
pub fn variant_bundle_name(prefix: &str, bundle_name: &str) -> String {
    format!("{prefix}{bundle_name}")
}

/// Name of the side-car metadata file written next to every archive.
pub fn sidecar_name(storage_name: &str) -> String {
    format!("{storage_name}.manifest")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_key_ignores_discovery_order() {
        let a = SharedGroupKey::compute(["ui", "hud"]);
        let b = SharedGroupKey::compute(["hud", "ui"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_shared_key_ignores_duplicates() {
        let a = SharedGroupKey::compute(["hud", "ui", "hud"]);
        let b = SharedGroupKey::compute(["hud", "ui"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_shared_key_is_digest_of_joined_owners() {
        let key = SharedGroupKey::compute(["ui", "hud"]);
        let expected = format!(
            "{SHARED_GROUP_PREFIX}{}",
            ContentHash::of_str("hud,ui").to_hex()
        );
        assert_eq!(key.as_str(), expected);
        assert!(key.is_valid());
    }

    #[test]
    fn test_different_owner_sets_get_different_keys() {
        let a = SharedGroupKey::compute(["hud", "ui"]);
        let b = SharedGroupKey::compute(["hud"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_real_bundle_name() {
        assert_eq!(real_bundle_name("ui", false), "ui");
        let obfuscated = real_bundle_name("ui", true);
        assert_eq!(obfuscated.len(), 64);
        assert_eq!(obfuscated, real_bundle_name("ui", true));
    }

    #[test]
    fn test_variant_name_is_prefix_plus_bundle() {
        assert_eq!(variant_bundle_name(DEFAULT_VARIANT_PREFIX, "ui"), "astc_ui");
        assert_eq!(sidecar_name("astc_ui"), "astc_ui.manifest");
    }
}
