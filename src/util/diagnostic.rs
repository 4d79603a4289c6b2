//! User-friendly diagnostic messages.
//!
//! Every error shown to the user should name the root cause and, where one
//! exists, a concrete fix.

use std::fmt;
use std::path::PathBuf;

use miette::{Diagnostic as MietteDiagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::core::errors::{ManifestError, ParseError};
use crate::core::syntax::SyntaxError;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when no go.mod is found.
    pub const NO_MOD_ROOT: &str = "Run `xgomod init <module-path>` to create a new module";

    /// Suggestion when a module is missing from go.mod.
    pub const CHECK_GO_MOD: &str = "Check the require and replace statements in go.mod";

    /// Suggestion when an imported module declares no project.
    pub const REMOVE_CLASS_IMPORT: &str = "Remove the `import` statement from gox.mod";

    /// Suggestion when standard packages cannot be located.
    pub const SET_GOROOT: &str = "Set GOROOT, or `env.goroot` in the xgomod config file";

    /// Suggestion when a dependency is missing.
    pub const MISSING_DEPENDENCY: &str =
        "Run `xgomod add <module>@<version>` to add it as a dependency";

    /// Suggestion for manifest syntax errors.
    pub const FIX_MANIFEST: &str = "Run `xgomod fmt --check` after fixing the file";

    /// Suggestion for fetch failures.
    pub const FETCH_FAILED: &str =
        "Check your network connection, or run `go mod download` in the module root";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
    Help,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
            Severity::Help => write!(f, "help"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    fn with_severity(message: impl Into<String>, severity: Severity) -> Self {
        Diagnostic {
            message: message.into(),
            severity,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_severity(message, Severity::Error)
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_severity(message, Severity::Warning)
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = if color {
            match self.severity {
                Severity::Error => "\x1b[1;31merror\x1b[0m",
                Severity::Warning => "\x1b[1;33mwarning\x1b[0m",
                Severity::Note => "\x1b[1;36mnote\x1b[0m",
                Severity::Help => "\x1b[1;32mhelp\x1b[0m",
            }
        } else {
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Note => "note",
                Severity::Help => "help",
            }
        };

        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  → {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            output.push_str(&format!("{}: consider:\n", help_prefix));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// A manifest error pointing into the manifest text.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("{message}")]
#[diagnostic(code(xgomod::manifest::invalid))]
pub struct ManifestSourceError {
    pub message: String,
    #[help]
    pub help: Option<String>,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("{label}")]
    pub span: SourceSpan,
    pub label: String,
}

impl ManifestSourceError {
    /// Point at a syntax error in `text`.
    pub fn from_syntax(err: &SyntaxError, text: &str) -> Self {
        Self::at(&err.file, text, err.pos.byte, err.to_string(), err.msg.clone())
    }

    /// Point at a rejected directive in `text`.
    pub fn from_directive(err: &ManifestError, text: &str) -> Self {
        Self::at(&err.file, text, err.pos.byte, err.to_string(), err.err.to_string())
    }

    /// One diagnostic per problem in `err`.
    pub fn from_parse(err: &ParseError, text: &str) -> Vec<Self> {
        match err {
            ParseError::Syntax(e) => vec![Self::from_syntax(e, text)],
            ParseError::Directives(list) => {
                list.iter().map(|e| Self::from_directive(e, text)).collect()
            }
        }
    }

    fn at(file: &str, text: &str, byte: usize, message: String, label: String) -> Self {
        let offset = byte.min(text.len());
        let len = text[offset..]
            .find('\n')
            .unwrap_or(text.len() - offset)
            .max(usize::from(offset < text.len()));
        ManifestSourceError {
            message,
            help: Some(suggestions::FIX_MANIFEST.to_string()),
            src: NamedSource::new(file, text.to_string()),
            span: (offset, len).into(),
            label,
        }
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
