//! The on-disk module cache.
//!
//! Downloaded modules live at `<root>/<escaped path>@<version>`, where
//! escaping replaces each upper-case letter `X` with `!x` so that paths
//! stay unique on case-insensitive filesystems.

use std::path::{Path, PathBuf};

use crate::core::gomod::ModuleVersion;

/// Where the module cache keeps a module.
pub trait ModuleCache {
    /// Directory of `module`. A version-less module is a local directory
    /// and is returned as is.
    fn path(&self, module: &ModuleVersion) -> PathBuf;
}

/// The module cache rooted at a directory such as `$GOPATH/pkg/mod`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModCache {
    root: PathBuf,
}

impl ModCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ModCache { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the zip archive the module was downloaded as.
    pub fn download_path(&self, module: &ModuleVersion) -> PathBuf {
        self.root
            .join("cache")
            .join("download")
            .join(escape_path(&module.path))
            .join("@v")
            .join(format!("{}.zip", escape_path(&module.version)))
    }

    /// Report whether `path` lies in the cache.
    pub fn in_path(&self, path: &Path) -> bool {
        path != self.root && path.starts_with(&self.root)
    }
}

impl ModuleCache for ModCache {
    fn path(&self, module: &ModuleVersion) -> PathBuf {
        if module.version.is_empty() {
            return PathBuf::from(&module.path);
        }
        self.root.join(format!(
            "{}@{}",
            escape_path(&module.path),
            escape_path(&module.version)
        ))
    }
}

/// Escape a module path or version for use as a cache file name.
pub fn escape_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            out.push('!');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_path() {
        assert_eq!(escape_path("github.com/BurntSushi/toml"), "github.com/!burnt!sushi/toml");
        assert_eq!(escape_path("v1.0.0-RC1"), "v1.0.0-!r!c1");
        assert_eq!(escape_path("golang.org/x/mod"), "golang.org/x/mod");
    }

    #[test]
    fn test_module_path() {
        let cache = ModCache::new("/gopath/pkg/mod");
        let m = ModuleVersion::new("github.com/goplus/Spx", "v1.0.0");
        assert_eq!(
            cache.path(&m),
            Path::new("/gopath/pkg/mod/github.com/goplus/!spx@v1.0.0")
        );
        assert_eq!(
            cache.download_path(&m),
            Path::new("/gopath/pkg/mod/cache/download/github.com/goplus/!spx/@v/v1.0.0.zip")
        );
    }

    #[test]
    fn test_local_module_path() {
        let cache = ModCache::new("/gopath/pkg/mod");
        let m = ModuleVersion::new("/work/local", "");
        assert_eq!(cache.path(&m), Path::new("/work/local"));
    }

    #[test]
    fn test_in_path() {
        let cache = ModCache::new("/gopath/pkg/mod");
        assert!(cache.in_path(Path::new("/gopath/pkg/mod/github.com/a@v1.0.0")));
        assert!(!cache.in_path(Path::new("/gopath/pkg/mod")));
        assert!(!cache.in_path(Path::new("/gopath/pkg/modx/a")));
    }
}
