//! Locating the files that make up a module on disk.
//!
//! A module root is the nearest directory holding a `go.mod`. The
//! classfile manifest lives next to it as `gox.mod`, or `gop.mod` in
//! older modules.

use std::path::{Path, PathBuf};

use crate::core::gomod::GO_MOD;
use crate::core::manifest::{GOP_MOD, GOX_MOD};

/// The manifest files of one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
    modfile: PathBuf,
    opt_file: PathBuf,
}

impl Workspace {
    /// Describe the module rooted at `root` without touching the disk
    /// beyond picking the classfile manifest name.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Workspace {
            modfile: root.join(GO_MOD),
            opt_file: opt_file_in(&root),
            root,
        }
    }

    /// A module whose manifest files were named explicitly.
    pub fn from_files(modfile: &Path, opt_file: &Path) -> Self {
        let root = modfile.parent().unwrap_or(Path::new("."));
        Workspace {
            root: root.to_path_buf(),
            modfile: modfile.to_path_buf(),
            opt_file: opt_file.to_path_buf(),
        }
    }

    /// Walk up from `dir` to the nearest directory holding a `go.mod`.
    pub fn find(dir: &Path) -> Option<Self> {
        let mut current = dir.to_path_buf();
        loop {
            if current.join(GO_MOD).is_file() {
                tracing::debug!("found module root at {}", current.display());
                return Some(Workspace::at(current));
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// The module root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the `go.mod` file.
    pub fn modfile(&self) -> &Path {
        &self.modfile
    }

    /// Path of the classfile manifest. It may not exist.
    pub fn opt_file(&self) -> &Path {
        &self.opt_file
    }

    /// Path of the checksum file.
    pub fn sum_file(&self) -> PathBuf {
        self.root.join("go.sum")
    }
}

/// Pick the classfile manifest of `root`: `gox.mod` unless only a
/// `gop.mod` exists.
pub fn opt_file_in(root: &Path) -> PathBuf {
    let gox = root.join(GOX_MOD);
    if gox.exists() {
        return gox;
    }
    let gop = root.join(GOP_MOD);
    if gop.exists() {
        return gop;
    }
    gox
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_walks_parents() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("go.mod"), "module example.com/m\n").unwrap();
        let nested = tmp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let ws = Workspace::find(&nested).unwrap();
        assert_eq!(ws.root(), tmp.path());
        assert_eq!(ws.modfile(), tmp.path().join("go.mod"));
        assert_eq!(ws.opt_file(), tmp.path().join("gox.mod"));
    }

    #[test]
    fn test_find_without_go_mod() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("x");
        fs::create_dir_all(&nested).unwrap();
        // The temp dir itself may sit below a go.mod on odd machines.
        if let Some(ws) = Workspace::find(&nested) {
            assert!(!ws.root().starts_with(tmp.path()));
        }
    }

    #[test]
    fn test_gop_mod_fallback() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(opt_file_in(tmp.path()), tmp.path().join("gox.mod"));

        fs::write(tmp.path().join("gop.mod"), "gop 1.2\n").unwrap();
        assert_eq!(opt_file_in(tmp.path()), tmp.path().join("gop.mod"));

        fs::write(tmp.path().join("gox.mod"), "xgo 1.5\n").unwrap();
        assert_eq!(opt_file_in(tmp.path()), tmp.path().join("gox.mod"));
    }
}
