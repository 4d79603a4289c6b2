//! Effective versions of a module's dependencies.

use std::collections::BTreeMap;
use std::path::Path;

use crate::core::gomod::{ModuleVersion, Replace, Require};
use crate::util::fs::absolute_path;

/// Module path to the module version that actually provides it.
///
/// A resolved version with an empty `version` is a local directory; its
/// `path` is then an absolute filesystem path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionMap {
    mods: BTreeMap<String, ModuleVersion>,
}

impl VersionMap {
    pub fn new() -> Self {
        VersionMap::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, resolved: ModuleVersion) {
        self.mods.insert(path.into(), resolved);
    }

    /// The resolved version of the dependency module `path`.
    pub fn get(&self, path: &str) -> Option<&ModuleVersion> {
        self.mods.get(path)
    }

    /// Find the dependency module providing package `pkg_path`.
    ///
    /// Among the module paths equal to `pkg_path` or prefixing it at a `/`
    /// boundary the longest wins, so `example.com/a/b` shadows
    /// `example.com/a` for packages under `example.com/a/b`. Returns the
    /// module path and its resolved version.
    pub fn owner_of(&self, pkg_path: &str) -> Option<(&str, &ModuleVersion)> {
        self.mods
            .iter()
            .filter(|(mod_path, _)| is_path_prefix(pkg_path, mod_path))
            .max_by_key(|(mod_path, _)| mod_path.len())
            .map(|(mod_path, resolved)| (mod_path.as_str(), resolved))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModuleVersion)> {
        self.mods.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.mods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }
}

/// Report whether `path` is `prefix` or lies below it.
pub fn is_path_prefix(path: &str, prefix: &str) -> bool {
    !prefix.is_empty()
        && path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Merge `require` and `replace` statements into a [`VersionMap`].
///
/// Replacements always win over requirements. A relative directory
/// replacement is anchored at `manifest_dir` and made absolute.
pub fn build_version_map(
    require: &[Require],
    replace: &[Replace],
    manifest_dir: &Path,
) -> VersionMap {
    let mut map = VersionMap::new();
    for r in require {
        if !r.module.path.is_empty() {
            map.insert(r.module.path.clone(), r.module.clone());
        }
    }
    for r in replace {
        let mut target = r.new.clone();
        if target.version.is_empty() && target.path.starts_with('.') {
            let dir = absolute_path(&manifest_dir.join(&target.path));
            target.path = dir.to_string_lossy().into_owned();
        }
        map.insert(r.old.path.clone(), target);
    }
    map
}
