//! Global context for xgomod operations.
//!
//! Provides centralized access to configuration, paths, and environment:
//! where the module cache is, where the standard library lives, and how
//! missing modules are downloaded.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use crate::core::module::{Module, ModuleError};
use crate::core::workspace::Workspace;
use crate::resolver::locator::PackageLocator;
use crate::sources::cache::ModCache;
use crate::sources::fetch::{Fetcher, GoCommandFetcher, OfflineFetcher};
use crate::util::config::{load_config, project_config_path, Config};
use crate::util::process::go_env;

/// Project directories for xgomod
static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("dev", "goplus", "xgomod"));

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Directory holding the global config file
    home: PathBuf,

    /// Whether to use colors in output
    color: bool,

    /// Merged configuration
    config: Config,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        let home = if let Some(dirs) = PROJECT_DIRS.as_ref() {
            dirs.config_dir().to_path_buf()
        } else {
            directories::BaseDirs::new()
                .map(|b| b.home_dir().join(".xgomod"))
                .unwrap_or_else(|| PathBuf::from(".xgomod"))
        };

        Ok(GlobalContext {
            cwd,
            home,
            color: true,
            config: Config::default(),
        })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Use `config` as is, skipping config files and the environment.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Read the global and project config files, then apply environment
    /// overrides.
    pub fn load_config(&mut self) {
        let project = match Workspace::find(&self.cwd) {
            Some(ws) => project_config_path(ws.root()),
            None => project_config_path(&self.cwd),
        };
        let mut config = load_config(&self.config_path(), &project);
        config.apply_env(|key| std::env::var(key).ok());
        self.config = config;
    }

    /// Set color output.
    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    /// Disable downloads regardless of configuration.
    pub fn set_offline(&mut self, offline: bool) {
        self.config.net.offline = offline;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check if color output is enabled.
    pub fn color(&self) -> bool {
        self.color
    }

    /// Load the module containing the working directory.
    pub fn load_module(&self) -> Result<Module, ModuleError> {
        Module::load(&self.cwd)
    }

    /// The module cache.
    pub fn mod_cache(&self) -> Result<ModCache> {
        let dir = self
            .config
            .mod_cache_dir()
            .context("cannot determine the module cache directory; set GOMODCACHE")?;
        Ok(ModCache::new(dir))
    }

    /// The directory holding standard packages, `$GOROOT/src`. Asks the
    /// `go` command when GOROOT is not configured.
    pub fn stdlib_root(&self) -> Option<PathBuf> {
        if let Some(goroot) = &self.config.env.goroot {
            return Some(goroot.join("src"));
        }
        let go = self.config.go_binary()?;
        match go_env(&go, "GOROOT") {
            Ok(goroot) if !goroot.is_empty() => Some(PathBuf::from(goroot).join("src")),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("cannot query GOROOT: {:#}", e);
                None
            }
        }
    }

    /// The fetcher for missing modules. Offline mode, or a missing `go`
    /// binary, disables downloads.
    pub fn fetcher(&self) -> Box<dyn Fetcher> {
        if self.config.net.offline {
            return Box::new(OfflineFetcher);
        }
        match self.config.go_binary() {
            Some(go) => {
                let mut fetcher = GoCommandFetcher::new(go);
                if let Some(dir) = &self.config.env.gomodcache {
                    fetcher = fetcher.with_mod_cache(dir);
                }
                Box::new(fetcher)
            }
            None => {
                tracing::debug!("`go` not found in PATH; missing modules cannot be downloaded");
                Box::new(OfflineFetcher)
            }
        }
    }

    /// A package locator for `module`.
    pub fn locator(&self, module: &Module) -> Result<PackageLocator> {
        let mut locator = PackageLocator::new(module, Box::new(self.mod_cache()?), self.fetcher());
        if let Some(root) = self.stdlib_root() {
            locator = locator.with_stdlib_root(root);
        }
        Ok(locator)
    }
}

impl Default for GlobalContext {
    fn default() -> Self {
        Self::new().expect("failed to create default GlobalContext")
    }
}
