//! Downloading modules into the module cache.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::gomod::ModuleVersion;
use crate::util::process::ProcessBuilder;

/// Errors that can occur while fetching a module.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("empty module path")]
    EmptyModulePath,

    #[error("failed to run `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("`{command}` failed: {message}")]
    Command { command: String, message: String },

    #[error("unexpected output from `{command}`")]
    Decode {
        command: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{module}: {message}")]
    Module { module: String, message: String },

    #[error("cannot download {module} in offline mode")]
    Offline { module: String },
}

/// Downloads a module into the module cache.
pub trait Fetcher {
    /// Fetch `module`, given as `path` or `path@query`, and return the
    /// version that was downloaded.
    fn fetch(&self, module: &str) -> Result<ModuleVersion, FetchError>;
}

/// The reply of `go mod download -json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DownloadInfo {
    #[serde(default)]
    path: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    error: Option<String>,
}

/// Fetches modules with `go mod download`.
#[derive(Debug, Clone)]
pub struct GoCommandFetcher {
    go: PathBuf,
    mod_cache: Option<PathBuf>,
}

impl GoCommandFetcher {
    pub fn new(go: impl Into<PathBuf>) -> Self {
        GoCommandFetcher {
            go: go.into(),
            mod_cache: None,
        }
    }

    /// Download into `dir` instead of the go command's default cache.
    pub fn with_mod_cache(mut self, dir: impl Into<PathBuf>) -> Self {
        self.mod_cache = Some(dir.into());
        self
    }
}

impl Fetcher for GoCommandFetcher {
    fn fetch(&self, module: &str) -> Result<ModuleVersion, FetchError> {
        if module.is_empty() {
            return Err(FetchError::EmptyModulePath);
        }
        let query = if module.contains('@') {
            module.to_string()
        } else {
            format!("{}@latest", module)
        };

        let mut cmd =
            ProcessBuilder::new(&self.go).args(["mod", "download", "-json", query.as_str()]);
        if let Some(dir) = &self.mod_cache {
            cmd = cmd.env("GOMODCACHE", dir.to_string_lossy());
        }
        let command = cmd.display_command();
        info!("fetching {}", query);
        debug!("running `{}`", command);

        let output = cmd.exec().map_err(|source| FetchError::Spawn {
            command: command.clone(),
            source,
        })?;

        // A failed download still prints its JSON reply with `Error` set.
        let info: DownloadInfo = match serde_json::from_slice(&output.stdout) {
            Ok(info) => info,
            Err(_) if !output.status.success() => {
                return Err(FetchError::Command {
                    command,
                    message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                })
            }
            Err(source) => return Err(FetchError::Decode { command, source }),
        };
        parse_reply(module, info)
    }
}

/// A fetcher for offline mode: every download fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineFetcher;

impl Fetcher for OfflineFetcher {
    fn fetch(&self, module: &str) -> Result<ModuleVersion, FetchError> {
        if module.is_empty() {
            return Err(FetchError::EmptyModulePath);
        }
        Err(FetchError::Offline {
            module: module.to_string(),
        })
    }
}

fn parse_reply(module: &str, info: DownloadInfo) -> Result<ModuleVersion, FetchError> {
    if let Some(message) = info.error.filter(|e| !e.is_empty()) {
        return Err(FetchError::Module {
            module: module.to_string(),
            message,
        });
    }
    debug!("fetched {}@{}", info.path, info.version);
    Ok(ModuleVersion::new(info.path, info.version))
}
