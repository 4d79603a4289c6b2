//! Resolution error types and diagnostics.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::module::ModuleError;
use crate::sources::fetch::FetchError;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error while locating a package or importing classfiles.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ResolveError {
    #[error("{module}: module not found")]
    #[diagnostic(
        code(xgomod::resolve::not_found),
        help("require the module in go.mod before importing its classfiles")
    )]
    NotFound { module: String },

    #[error("{module}: not a classfile module")]
    #[diagnostic(
        code(xgomod::resolve::not_classfile),
        help("the module's gox.mod declares no project")
    )]
    NotClassfileModule { module: String },

    #[error("no required module provides package {path}; to add it:\n\txgo get {path}")]
    #[diagnostic(code(xgomod::resolve::missing_package))]
    MissingPackage { path: String },

    #[error("invalid package path {path:?}")]
    #[diagnostic(code(xgomod::resolve::invalid_path))]
    InvalidPackagePath { path: String },

    #[error("cannot locate standard package {path}: GOROOT is unknown")]
    #[diagnostic(
        code(xgomod::resolve::no_goroot),
        help("set GOROOT or `env.goroot` in config.toml")
    )]
    NoGoroot { path: String },

    #[error("failed to fetch {module}")]
    #[diagnostic(code(xgomod::resolve::fetch))]
    Fetch {
        module: String,
        #[source]
        source: FetchError,
    },

    #[error("failed to load module {module}")]
    #[diagnostic(code(xgomod::resolve::load))]
    LoadModule {
        module: String,
        #[source]
        source: ModuleError,
    },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::NotFound { module } => {
                Diagnostic::error(format!("classfile module `{}` is not a dependency", module))
                    .with_suggestion(format!("xgo get {}", module))
                    .with_suggestion(suggestions::CHECK_GO_MOD)
            }

            ResolveError::NotClassfileModule { module } => {
                Diagnostic::error(format!("`{}` is not a classfile module", module))
                    .with_context("its gox.mod declares no project")
                    .with_suggestion(suggestions::REMOVE_CLASS_IMPORT)
            }

            ResolveError::MissingPackage { path } => {
                Diagnostic::error(format!("no required module provides package `{}`", path))
                    .with_suggestion(format!("xgo get {}", path))
            }

            ResolveError::InvalidPackagePath { path } => {
                Diagnostic::error(format!("invalid package path `{}`", path)).with_context(
                    "relative import paths must be resolved before lookup",
                )
            }

            ResolveError::NoGoroot { path } => {
                Diagnostic::error(format!("cannot locate standard package `{}`", path))
                    .with_context("GOROOT is unknown")
                    .with_suggestion(suggestions::SET_GOROOT)
            }

            ResolveError::Fetch { module, source } => {
                Diagnostic::error(format!("failed to fetch `{}`", module))
                    .with_context(source.to_string())
                    .with_suggestion(suggestions::FETCH_FAILED)
            }

            ResolveError::LoadModule { module, source } => {
                let mut diag = Diagnostic::error(format!("failed to load module `{}`", module))
                    .with_context(source.to_string());
                if source.is_not_found() {
                    diag = diag.with_suggestion(suggestions::FETCH_FAILED);
                }
                diag
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_package_message() {
        let err = ResolveError::MissingPackage {
            path: "github.com/goplus/yap/ytest".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no required module provides package github.com/goplus/yap/ytest; to add it:\n\txgo get github.com/goplus/yap/ytest"
        );
    }

    #[test]
    fn test_not_found_diagnostic() {
        let err = ResolveError::NotFound {
            module: "github.com/goplus/yap".to_string(),
        };
        let output = err.to_diagnostic().format(false);
        assert!(output.contains("error: classfile module `github.com/goplus/yap`"));
        assert!(output.contains("1. xgo get github.com/goplus/yap"));
    }

    #[test]
    fn test_fetch_diagnostic_carries_cause() {
        let err = ResolveError::Fetch {
            module: "example.com/x@v1.0.0".to_string(),
            source: FetchError::EmptyModulePath,
        };
        let output = err.to_diagnostic().format(false);
        assert!(output.contains("empty module path"));
        assert!(output.contains("help: consider:"));
    }
}
