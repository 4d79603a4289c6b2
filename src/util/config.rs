//! Configuration file support.
//!
//! Two configuration file locations are read:
//! - Global: `config.toml` in the user configuration directory
//! - Project: `.xgomod/config.toml` in the module root
//!
//! Project config takes precedence over global config, and the `GOROOT`,
//! `GOMODCACHE` and `GOPATH` environment variables take precedence over
//! both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Go environment settings
    pub env: EnvConfig,

    /// Network settings
    pub net: NetConfig,
}

/// Where the Go toolchain and its module cache live.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Go installation root; standard packages live in `<goroot>/src`
    pub goroot: Option<PathBuf>,

    /// Module cache directory
    pub gomodcache: Option<PathBuf>,

    /// Path to the `go` binary
    pub go: Option<PathBuf>,
}

/// Network-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Never download missing modules
    pub offline: bool,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents =
            toml::to_string_pretty(self).with_context(|| "failed to serialize config")?;
        crate::util::fs::write_string(path, &contents)
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.env.goroot.is_some() {
            self.env.goroot = other.env.goroot;
        }
        if other.env.gomodcache.is_some() {
            self.env.gomodcache = other.env.gomodcache;
        }
        if other.env.go.is_some() {
            self.env.go = other.env.go;
        }
        if other.net.offline {
            self.net.offline = true;
        }
    }

    /// Apply `GOROOT`, `GOMODCACHE` and `GOPATH` from `var`.
    ///
    /// `GOPATH` only matters when no module cache is set otherwise; the
    /// cache is then `pkg/mod` under its first entry.
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| var(key).filter(|v| !v.is_empty());
        if let Some(goroot) = get("GOROOT") {
            self.env.goroot = Some(PathBuf::from(goroot));
        }
        if let Some(cache) = get("GOMODCACHE") {
            self.env.gomodcache = Some(PathBuf::from(cache));
        } else if self.env.gomodcache.is_none() {
            if let Some(gopath) = get("GOPATH") {
                if let Some(first) = std::env::split_paths(&gopath).next() {
                    self.env.gomodcache = Some(first.join("pkg").join("mod"));
                }
            }
        }
    }

    /// The module cache directory, defaulting to `~/go/pkg/mod`.
    pub fn mod_cache_dir(&self) -> Option<PathBuf> {
        self.env.gomodcache.clone().or_else(|| {
            directories::BaseDirs::new().map(|b| b.home_dir().join("go").join("pkg").join("mod"))
        })
    }

    /// The `go` binary: the configured one, or `go` found in `PATH`.
    pub fn go_binary(&self) -> Option<PathBuf> {
        self.env
            .go
            .clone()
            .or_else(|| crate::util::process::find_executable("go"))
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.xgomod/config.toml)
/// 2. Global config
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        let global = Config::load_or_default(global_path);
        config.merge(global);
    }

    if project_path.exists() {
        let project = Config::load_or_default(project_path);
        config.merge(project);
    }

    config
}

/// Get the project config path (.xgomod/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".xgomod").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.env.goroot.is_none());
        assert!(!config.net.offline);
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[env]
goroot = "/usr/local/go"
gomodcache = "/cache"

[net]
offline = true
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.env.goroot, Some(PathBuf::from("/usr/local/go")));
        assert_eq!(config.mod_cache_dir(), Some(PathBuf::from("/cache")));
        assert!(config.net.offline);
    }

    #[test]
    fn test_config_load_rejects_bad_toml() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(&config_path, "[env\n").unwrap();
        assert!(Config::load(&config_path).is_err());
        assert_eq!(Config::load_or_default(&config_path), Config::default());
    }

    #[test]
    fn test_load_config_project_wins() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = project_config_path(tmp.path());
        std::fs::write(&global, "[env]\ngoroot = \"/a\"\ngo = \"/bin/go\"\n").unwrap();
        Config {
            env: EnvConfig {
                goroot: Some("/b".into()),
                ..Default::default()
            },
            ..Default::default()
        }
        .save(&project)
        .unwrap();

        let config = load_config(&global, &project);
        assert_eq!(config.env.goroot, Some(PathBuf::from("/b")));
        assert_eq!(config.env.go, Some(PathBuf::from("/bin/go")));
    }

    #[test]
    fn test_apply_env() {
        let vars: HashMap<&str, &str> = [("GOROOT", "/go"), ("GOPATH", "/home/u/go")].into();
        let mut config = Config::default();
        config.apply_env(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.env.goroot, Some(PathBuf::from("/go")));
        assert_eq!(config.env.gomodcache, Some(PathBuf::from("/home/u/go/pkg/mod")));

        let vars: HashMap<&str, &str> = [("GOMODCACHE", "/mc"), ("GOROOT", "")].into();
        let mut config = Config::default();
        config.env.goroot = Some("/keep".into());
        config.apply_env(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.env.goroot, Some(PathBuf::from("/keep")));
        assert_eq!(config.env.gomodcache, Some(PathBuf::from("/mc")));
    }
}
