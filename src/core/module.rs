//! A module: its `go.mod` together with its classfile manifest.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::core::errors::{DirectiveError, ParseError};
use crate::core::gomod::{GoMod, ModuleVersion, GO_MOD};
use crate::core::manifest::{Manifest, Project, GOX_MOD};
use crate::core::workspace::{opt_file_in, Workspace};
use crate::resolver::version_map::{build_version_map, VersionMap};
use crate::sources::sumfile::SumFile;
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::fs::absolute_path;

/// Go version written by [`Module::create`] when none is given.
pub const DEFAULT_GO_VERSION: &str = "1.18";

/// XGo version of modules without a classfile manifest.
pub const DEFAULT_XGO_VERSION: &str = "1.2";

/// Path of the XGo module itself.
pub const XGO_MOD_PATH: &str = "github.com/goplus/xgo";

/// Errors that can occur while loading or saving a module.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("go.mod file not found in current directory or any parent directory")]
    NoModRoot { dir: PathBuf },

    #[error("no module declaration in a .mod file")]
    NoModDecl { file: PathBuf },

    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("attempt to save default project")]
    SaveDefault,

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Edit(#[from] DirectiveError),
}

impl ModuleError {
    /// Report whether the module files do not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            ModuleError::NoModRoot { .. } => true,
            ModuleError::Read { source, .. } => source.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ModuleError::NoModRoot { dir } => Diagnostic::error(self.to_string())
                .with_context(format!("searched from {}", dir.display()))
                .with_suggestion(suggestions::NO_MOD_ROOT),

            ModuleError::NoModDecl { file } => Diagnostic::error(self.to_string())
                .with_location(file)
                .with_suggestion("Add a `module <path>` statement"),

            ModuleError::AlreadyExists(path) => Diagnostic::error(self.to_string())
                .with_suggestion(format!("Edit the existing {} instead", path.display())),

            ModuleError::Read { source, .. } | ModuleError::Write { source, .. } => {
                Diagnostic::error(self.to_string()).with_context(source.to_string())
            }

            ModuleError::Parse(err) => {
                let mut diag = Diagnostic::error("invalid manifest");
                for line in err.to_string().lines() {
                    diag = diag.with_context(line);
                }
                diag.with_suggestion(suggestions::FIX_MANIFEST)
            }

            ModuleError::SaveDefault | ModuleError::Edit(_) => Diagnostic::error(self.to_string()),
        }
    }
}

/// A loaded module.
#[derive(Debug, Clone)]
pub struct Module {
    pub gomod: GoMod,
    /// The classfile manifest (`gox.mod`).
    pub opt: Manifest,
    files: Option<Workspace>,
}

impl Default for Module {
    /// The module used outside of any module: no path, no files, the
    /// default language versions and no projects.
    fn default() -> Self {
        let mut gomod = GoMod::new(GO_MOD);
        gomod.set_go_version(DEFAULT_GO_VERSION);
        Module {
            gomod,
            opt: default_opt(GOX_MOD),
            files: None,
        }
    }
}

fn default_opt(name: &str) -> Manifest {
    let mut opt = Manifest::new(name);
    opt.set_version(DEFAULT_XGO_VERSION);
    opt
}

fn read_file(path: &Path) -> io::Result<Vec<u8>> {
    fs::read(path)
}

impl Module {
    /// Load the module containing `dir`.
    pub fn load(dir: &Path) -> Result<Module, ModuleError> {
        let ws = Workspace::find(dir).ok_or_else(|| ModuleError::NoModRoot {
            dir: dir.to_path_buf(),
        })?;
        Module::load_from(ws.modfile(), ws.opt_file())
    }

    /// Load the module rooted at `dir`, without searching parents.
    pub fn load_dir(dir: &Path) -> Result<Module, ModuleError> {
        Module::load_from(&dir.join(GO_MOD), &opt_file_in(dir))
    }

    /// Load a module from explicit `go.mod` and `gox.mod` paths. A
    /// missing `gox.mod` is not an error.
    pub fn load_from(gomod: &Path, opt_file: &Path) -> Result<Module, ModuleError> {
        Module::load_from_with(gomod, opt_file, read_file)
    }

    /// Like [`Module::load_from`], reading files through `read`.
    pub fn load_from_with<F>(gomod: &Path, opt_file: &Path, read: F) -> Result<Module, ModuleError>
    where
        F: Fn(&Path) -> io::Result<Vec<u8>>,
    {
        let data = read(gomod).map_err(|source| ModuleError::Read {
            path: gomod.to_path_buf(),
            source,
        })?;
        let gomod_file = GoMod::parse(&gomod.to_string_lossy(), &data)?;
        if gomod_file.module.is_none() {
            return Err(ModuleError::NoModDecl {
                file: gomod.to_path_buf(),
            });
        }

        let opt_name = opt_file.to_string_lossy();
        let opt = match read(opt_file) {
            Ok(data) => Manifest::parse_lax(&opt_name, &data)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => default_opt(&opt_name),
            Err(source) => {
                return Err(ModuleError::Read {
                    path: opt_file.to_path_buf(),
                    source,
                })
            }
        };

        let module = Module {
            gomod: gomod_file,
            opt,
            files: Some(Workspace::from_files(gomod, opt_file)),
        };
        debug!(
            "loaded module {} ({} projects, {} classfile modules)",
            module.path(),
            module.opt.projects.len(),
            module.class_mods().len()
        );
        Ok(module)
    }

    /// Create a new module in `dir`. Empty versions pick the defaults.
    ///
    /// Nothing is written until [`Module::save`].
    pub fn create(
        dir: &Path,
        mod_path: &str,
        go_version: &str,
        xgo_version: &str,
    ) -> Result<Module, ModuleError> {
        let root = absolute_path(dir);
        let ws = Workspace::at(&root);
        if ws.modfile().exists() {
            return Err(ModuleError::AlreadyExists(ws.modfile().to_path_buf()));
        }
        if ws.opt_file().exists() {
            return Err(ModuleError::AlreadyExists(ws.opt_file().to_path_buf()));
        }

        let go_version = if go_version.is_empty() {
            DEFAULT_GO_VERSION
        } else {
            go_version
        };
        let xgo_version = if xgo_version.is_empty() {
            DEFAULT_XGO_VERSION
        } else {
            xgo_version
        };

        let mut gomod = GoMod::new(ws.modfile().to_string_lossy());
        gomod.add_module_stmt(mod_path);
        gomod.add_go_stmt(go_version)?;

        let mut opt = Manifest::new(ws.opt_file().to_string_lossy());
        opt.add_or_update_version(xgo_version)?;

        Ok(Module {
            gomod,
            opt,
            files: Some(ws),
        })
    }

    /// Write `go.mod`, and `gox.mod` when the module declares projects.
    pub fn save(&self) -> Result<(), ModuleError> {
        let ws = self.files.as_ref().ok_or(ModuleError::SaveDefault)?;
        write_file(ws.modfile(), &self.gomod.format())?;
        if self.has_project() {
            write_file(ws.opt_file(), &self.opt.format())?;
        }
        Ok(())
    }

    /// Require `path` at `version`. With `has_proj` the requirement is
    /// also marked as a classfile module.
    pub fn add_require(
        &mut self,
        path: &str,
        version: &str,
        has_proj: bool,
    ) -> Result<(), ModuleError> {
        self.gomod.add_require(path, version)?;
        if has_proj {
            self.gomod.mark_class(path);
        }
        Ok(())
    }

    /// The module path.
    pub fn path(&self) -> &str {
        self.gomod.path()
    }

    /// The module root directory. `None` for the default module.
    pub fn root(&self) -> Option<&Path> {
        self.files.as_ref().map(|ws| ws.root())
    }

    /// Path of the `go.mod` file. `None` for the default module.
    pub fn modfile(&self) -> Option<&Path> {
        self.files.as_ref().map(|ws| ws.modfile())
    }

    /// Path of the classfile manifest. `None` for the default module.
    pub fn opt_file(&self) -> Option<&Path> {
        self.files.as_ref().map(|ws| ws.opt_file())
    }

    /// Path of `go.sum`. `None` for the default module.
    pub fn sum_file(&self) -> Option<PathBuf> {
        self.files.as_ref().map(|ws| ws.sum_file())
    }

    /// Projects declared by this module.
    pub fn projects(&self) -> &[Project] {
        &self.opt.projects
    }

    pub fn has_project(&self) -> bool {
        !self.opt.projects.is_empty()
    }

    /// Classfile modules imported by this module: `gox.mod` imports
    /// first, then `//xgo:class` requirements, without duplicates.
    pub fn class_mods(&self) -> Vec<&str> {
        let mut mods: Vec<&str> = Vec::new();
        for path in self.opt.class_mods().chain(self.gomod.class_mods()) {
            if !mods.contains(&path) {
                mods.push(path);
            }
        }
        mods
    }

    /// Report whether this is the XGo module itself.
    pub fn is_xgo_mod(&self) -> bool {
        matches!(self.path(), XGO_MOD_PATH | "github.com/goplus/gop")
    }

    /// The effective version of every dependency.
    pub fn dep_mods(&self) -> VersionMap {
        let root = self.root().unwrap_or(Path::new("."));
        build_version_map(&self.gomod.require, &self.gomod.replace, root)
    }

    /// The effective version of dependency module `path`.
    pub fn lookup_dep_mod(&self, path: &str) -> Option<ModuleVersion> {
        self.dep_mods().get(path).cloned()
    }

    /// Copy the checksums of `module` from `from` into this module's
    /// `go.sum`. Returns false if `go.sum` already has them.
    pub fn import_sums(&self, from: &SumFile, module: &str) -> anyhow::Result<bool> {
        let Some(path) = self.sum_file() else {
            return Ok(false);
        };
        let mut sums = SumFile::load(&path)?;
        if !sums.lookup(module).is_empty() {
            return Ok(false);
        }
        let lines = from.lookup(module);
        if lines.is_empty() {
            return Ok(false);
        }
        sums.add(lines.iter().cloned());
        sums.save()?;
        Ok(true)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), ModuleError> {
    fs::write(path, contents).map_err(|source| ModuleError::Write {
        path: path.to_path_buf(),
        source,
    })
}
