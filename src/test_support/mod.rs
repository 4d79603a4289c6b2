//! Test utilities and mocks for unit tests.
//!
//! Provides an in-memory filesystem for [`Module::load_from_with`], a
//! [`Fetcher`] that "downloads" modules by writing them into a cache
//! directory, and module fixtures.
//!
//! [`Module::load_from_with`]: crate::core::module::Module::load_from_with

pub mod fixtures;

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::core::gomod::ModuleVersion;
use crate::sources::cache::{ModCache, ModuleCache};
use crate::sources::fetch::{FetchError, Fetcher};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Mock filesystem for testing without real I/O.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        MockFileSystem::default()
    }

    /// Add a file with the given content.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.files.insert(path.as_ref().to_path_buf(), content.into());
    }

    /// Read a file's contents.
    pub fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }
}

#[derive(Debug, Default)]
struct FetcherState {
    /// Modules available for download, by `path@version`, with the
    /// `gox.mod` they carry.
    available: HashMap<String, Option<String>>,
    fetched: Vec<String>,
}

/// A fetcher that materializes known modules in a cache directory.
///
/// Clones share state, so a test can keep one handle while the code under
/// test owns another.
#[derive(Debug, Clone)]
pub struct MemoryFetcher {
    cache: ModCache,
    state: Arc<Mutex<FetcherState>>,
}

impl MemoryFetcher {
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        MemoryFetcher {
            cache: ModCache::new(cache_root),
            state: Arc::default(),
        }
    }

    /// Make `module` (`path@version`) downloadable.
    pub fn provide(&self, module: &str, gox_mod: Option<&str>) {
        self.state
            .lock()
            .unwrap()
            .available
            .insert(module.to_string(), gox_mod.map(str::to_string));
    }

    /// Every module fetched so far, in order.
    pub fn fetched(&self) -> Vec<String> {
        self.state.lock().unwrap().fetched.clone()
    }
}

impl Fetcher for MemoryFetcher {
    fn fetch(&self, module: &str) -> Result<ModuleVersion, FetchError> {
        if module.is_empty() {
            return Err(FetchError::EmptyModulePath);
        }
        let mut state = self.state.lock().unwrap();
        state.fetched.push(module.to_string());

        let found = state
            .available
            .iter()
            .find(|(key, _)| key.as_str() == module || key.split('@').next() == Some(module))
            .map(|(key, gox)| (key.clone(), gox.clone()));
        let Some((key, gox_mod)) = found else {
            return Err(FetchError::Module {
                module: module.to_string(),
                message: "not found".to_string(),
            });
        };

        let (path, version) = key.split_once('@').unwrap_or((key.as_str(), ""));
        let resolved = ModuleVersion::new(path, version);
        write_module(
            &self.cache.path(&resolved),
            &format!("module {}\n", path),
            gox_mod.as_deref(),
        );
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mock_filesystem() {
        let mut fs = MockFileSystem::new();
        fs.add_file("/m/go.mod", "module example.com/m\n");
        assert_eq!(fs.read(Path::new("/m/go.mod")).unwrap(), b"module example.com/m\n");
        assert_eq!(
            fs.read(Path::new("/m/gox.mod")).unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn test_memory_fetcher() {
        let tmp = TempDir::new().unwrap();
        let fetcher = MemoryFetcher::new(tmp.path());
        fetcher.provide("github.com/goplus/Yap@v0.7.2", Some("xgo 1.5\n"));

        let got = fetcher.fetch("github.com/goplus/Yap").unwrap();
        assert_eq!(got, ModuleVersion::new("github.com/goplus/Yap", "v0.7.2"));
        assert!(tmp.path().join("github.com/goplus/!yap@v0.7.2/gox.mod").exists());

        assert!(fetcher.fetch("example.com/none@v1.0.0").is_err());
        assert_eq!(
            fetcher.fetched(),
            ["github.com/goplus/Yap", "example.com/none@v1.0.0"]
        );
    }
}
