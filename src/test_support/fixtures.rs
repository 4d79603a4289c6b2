//! Test fixtures for common test scenarios.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Write a module to `dir`: its `go.mod` and, if given, its `gox.mod`.
pub fn write_module(dir: &Path, gomod: &str, gox_mod: Option<&str>) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("go.mod"), gomod).unwrap();
    if let Some(gox) = gox_mod {
        fs::write(dir.join("gox.mod"), gox).unwrap();
    }
}

/// Fixture for a module directory with source files.
#[derive(Debug, Clone)]
pub struct ModuleFixture {
    /// Module path.
    pub path: String,
    /// Extra `go.mod` text after the module statement.
    pub gomod_extra: String,
    /// `gox.mod` content, if any.
    pub gox_mod: Option<String>,
    /// Files (path relative to the module root -> content).
    pub files: BTreeMap<PathBuf, String>,
}

impl ModuleFixture {
    pub fn new(path: impl Into<String>) -> Self {
        ModuleFixture {
            path: path.into(),
            gomod_extra: String::new(),
            gox_mod: None,
            files: BTreeMap::new(),
        }
    }

    /// Append text to `go.mod`.
    pub fn with_gomod(mut self, text: impl Into<String>) -> Self {
        self.gomod_extra.push_str(&text.into());
        self
    }

    pub fn with_gox_mod(mut self, text: impl Into<String>) -> Self {
        self.gox_mod = Some(text.into());
        self
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    /// The full `go.mod` text.
    pub fn gomod(&self) -> String {
        let mut text = format!("module {}\n", self.path);
        if !self.gomod_extra.is_empty() {
            text.push('\n');
            text.push_str(&self.gomod_extra);
        }
        text
    }

    /// Write this fixture into `dir`.
    pub fn write_to(&self, dir: &Path) -> std::io::Result<()> {
        fs::create_dir_all(dir)?;
        fs::write(dir.join("go.mod"), self.gomod())?;
        if let Some(gox) = &self.gox_mod {
            fs::write(dir.join("gox.mod"), gox)?;
        }
        for (rel_path, content) in &self.files {
            let full_path = dir.join(rel_path);
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&full_path, content)?;
        }
        Ok(())
    }

    /// Write this fixture into a [`MockFileSystem`](super::MockFileSystem).
    pub fn write_to_mock(&self, fs: &mut super::MockFileSystem, dir: &Path) {
        fs.add_file(dir.join("go.mod"), self.gomod());
        if let Some(gox) = &self.gox_mod {
            fs.add_file(dir.join("gox.mod"), gox.as_bytes());
        }
        for (rel_path, content) in &self.files {
            fs.add_file(dir.join(rel_path), content.as_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::module::Module;
    use crate::test_support::MockFileSystem;
    use tempfile::TempDir;

    #[test]
    fn test_module_fixture_loads() {
        let tmp = TempDir::new().unwrap();
        ModuleFixture::new("example.com/game")
            .with_gomod("go 1.21\n")
            .with_file("Hero.spx", "onClick => {}\n")
            .write_to(tmp.path())
            .unwrap();

        let m = Module::load_dir(tmp.path()).unwrap();
        assert_eq!(m.path(), "example.com/game");
        assert!(tmp.path().join("Hero.spx").exists());
    }

    #[test]
    fn test_module_fixture_in_mock_fs() {
        let mut fs = MockFileSystem::new();
        ModuleFixture::new("example.com/m")
            .with_gox_mod("xgo 1.5\nproject .gmx Game pkgA\n")
            .write_to_mock(&mut fs, Path::new("/m"));

        let m = Module::load_from_with(Path::new("/m/go.mod"), Path::new("/m/gox.mod"), |p| {
            fs.read(p)
        })
        .unwrap();
        assert_eq!(m.projects().len(), 1);
    }
}
