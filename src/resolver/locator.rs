//! Classifying import paths and finding packages on disk.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::gomod::ModuleVersion;
use crate::core::module::Module;
use crate::resolver::errors::ResolveError;
use crate::resolver::version_map::{is_path_prefix, VersionMap};
use crate::sources::cache::ModuleCache;
use crate::sources::fetch::Fetcher;

/// What kind of package an import path names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PkgKind {
    Invalid,
    /// A standard library package such as `fmt`.
    Standard,
    /// A package of the current module.
    InModule,
    /// A relative path such as `./foo`.
    LocalRelative,
    /// A package of a dependency module.
    External,
}

impl fmt::Display for PkgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PkgKind::Invalid => "invalid",
            PkgKind::Standard => "standard",
            PkgKind::InModule => "module",
            PkgKind::LocalRelative => "local",
            PkgKind::External => "external",
        };
        f.write_str(s)
    }
}

/// Classify `pkg_path` as seen from module `mod_path`.
pub fn classify(pkg_path: &str, mod_path: &str) -> PkgKind {
    if pkg_path.is_empty() {
        return PkgKind::Invalid;
    }
    if is_path_prefix(pkg_path, mod_path) {
        return PkgKind::InModule;
    }
    if pkg_path.starts_with('.') {
        return PkgKind::LocalRelative;
    }
    let first = pkg_path.split('/').next().unwrap_or_default();
    if first.contains('.') {
        PkgKind::External
    } else {
        PkgKind::Standard
    }
}

/// A located package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub kind: PkgKind,
    /// Directory of the package.
    pub dir: PathBuf,
    /// Root directory of the module providing the package.
    pub mod_dir: PathBuf,
    /// Path of the module providing the package; empty for the standard
    /// library.
    pub mod_path: String,
    /// The module version the package was found in. Only set for
    /// external packages.
    pub real: Option<ModuleVersion>,
}

/// Resolves import paths against one module and its dependencies.
pub struct PackageLocator {
    mod_path: String,
    mod_root: PathBuf,
    deps: VersionMap,
    stdlib_root: Option<PathBuf>,
    cache: Box<dyn ModuleCache>,
    fetcher: Box<dyn Fetcher>,
}

impl PackageLocator {
    pub fn new(module: &Module, cache: Box<dyn ModuleCache>, fetcher: Box<dyn Fetcher>) -> Self {
        PackageLocator {
            mod_path: module.path().to_string(),
            mod_root: module.root().map(Path::to_path_buf).unwrap_or_default(),
            deps: module.dep_mods(),
            stdlib_root: None,
            cache,
            fetcher,
        }
    }

    /// Set the directory standard packages live in, usually `$GOROOT/src`.
    pub fn with_stdlib_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.stdlib_root = Some(dir.into());
        self
    }

    pub fn mod_path(&self) -> &str {
        &self.mod_path
    }

    /// The dependency version map this locator resolves against.
    pub fn deps(&self) -> &VersionMap {
        &self.deps
    }

    /// The effective version of dependency module `path`.
    pub fn lookup_dep_mod(&self, path: &str) -> Option<&ModuleVersion> {
        self.deps.get(path)
    }

    pub fn classify(&self, pkg_path: &str) -> PkgKind {
        classify(pkg_path, &self.mod_path)
    }

    /// Find the directory of `pkg_path`.
    ///
    /// Relative and empty paths are rejected; callers resolve them first.
    pub fn lookup(&self, pkg_path: &str) -> Result<Package, ResolveError> {
        match self.classify(pkg_path) {
            PkgKind::Standard => {
                let root = self.stdlib_root.as_ref().ok_or_else(|| ResolveError::NoGoroot {
                    path: pkg_path.to_string(),
                })?;
                Ok(Package {
                    kind: PkgKind::Standard,
                    dir: root.join(pkg_path),
                    mod_dir: root.clone(),
                    mod_path: String::new(),
                    real: None,
                })
            }
            PkgKind::InModule => Ok(Package {
                kind: PkgKind::InModule,
                dir: join_suffix(&self.mod_root, &pkg_path[self.mod_path.len()..]),
                mod_dir: self.mod_root.clone(),
                mod_path: self.mod_path.clone(),
                real: None,
            }),
            PkgKind::External => self.lookup_external(pkg_path),
            PkgKind::LocalRelative | PkgKind::Invalid => Err(ResolveError::InvalidPackagePath {
                path: pkg_path.to_string(),
            }),
        }
    }

    fn lookup_external(&self, pkg_path: &str) -> Result<Package, ResolveError> {
        let missing = || ResolveError::MissingPackage {
            path: pkg_path.to_string(),
        };
        let (mod_path, resolved) = self.deps.owner_of(pkg_path).ok_or_else(missing)?;

        let mod_dir = self.cache.path(resolved);
        if !mod_dir.exists() {
            if resolved.version.is_empty() {
                return Err(missing());
            }
            self.fetch(&resolved.to_string())?;
            if !mod_dir.exists() {
                return Err(missing());
            }
        }

        debug!("{} found in {}", pkg_path, resolved);
        Ok(Package {
            kind: PkgKind::External,
            dir: join_suffix(&mod_dir, &pkg_path[mod_path.len()..]),
            mod_dir,
            mod_path: mod_path.to_string(),
            real: Some(resolved.clone()),
        })
    }

    /// A unique id for package `pkg_path`: the import path of a standard
    /// package, otherwise its directory.
    pub fn pkg_id(&self, pkg_path: &str) -> Result<String, ResolveError> {
        match self.classify(pkg_path) {
            PkgKind::Standard => Ok(pkg_path.to_string()),
            PkgKind::InModule => {
                let dir = join_suffix(&self.mod_root, &pkg_path[self.mod_path.len()..]);
                Ok(dir.to_string_lossy().into_owned())
            }
            PkgKind::External => {
                let pkg = self.lookup_external(pkg_path)?;
                Ok(pkg.dir.to_string_lossy().into_owned())
            }
            PkgKind::LocalRelative | PkgKind::Invalid => Err(ResolveError::InvalidPackagePath {
                path: pkg_path.to_string(),
            }),
        }
    }

    /// Load the module `resolved` from the module cache, downloading it
    /// first when it is not there yet.
    pub fn load_module(&self, resolved: &ModuleVersion) -> Result<Module, ResolveError> {
        let load_err = |module: &ModuleVersion, source| ResolveError::LoadModule {
            module: module.to_string(),
            source,
        };
        match Module::load_dir(&self.cache.path(resolved)) {
            Ok(module) => Ok(module),
            Err(e) if e.is_not_found() && !resolved.version.is_empty() => {
                let fetched = self.fetch(&resolved.to_string())?;
                Module::load_dir(&self.cache.path(&fetched)).map_err(|e| load_err(&fetched, e))
            }
            Err(e) => Err(load_err(resolved, e)),
        }
    }

    fn fetch(&self, module: &str) -> Result<ModuleVersion, ResolveError> {
        info!("downloading {}", module);
        self.fetcher
            .fetch(module)
            .map_err(|source| ResolveError::Fetch {
                module: module.to_string(),
                source,
            })
    }
}

fn join_suffix(dir: &Path, suffix: &str) -> PathBuf {
    let suffix = suffix.trim_start_matches('/');
    if suffix.is_empty() {
        dir.to_path_buf()
    } else {
        dir.join(suffix)
    }
}
