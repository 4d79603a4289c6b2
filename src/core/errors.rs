//! Manifest parse errors.
//!
//! Directive problems are collected per statement and reported together as
//! an [`ErrorList`]; each entry carries the file name and the position of
//! the offending line.

use std::fmt;

use thiserror::Error;

use crate::core::syntax::{write_pos, Position, QuoteError, SyntaxError};

/// Why a single token was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error(transparent)]
    Quote(#[from] QuoteError),

    #[error("unquoted string cannot contain quote")]
    StrayQuote,

    #[error("invalid ext format")]
    ExtFormat,

    #[error("invalid Go export symbol format")]
    SymbolFormat,
}

/// A token that is not a valid classfile extension.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ext {ext} invalid: {cause}")]
pub struct InvalidExtError {
    pub ext: String,
    #[source]
    pub cause: ValueError,
}

/// A token that is not a valid exported symbol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("symbol {sym} invalid: {cause}")]
pub struct InvalidSymbolError {
    pub sym: String,
    #[source]
    pub cause: ValueError,
}

/// A rejected directive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    /// Ordering, repetition or argument-count problems.
    #[error("{0}")]
    Semantic(String),

    #[error(transparent)]
    Ext(#[from] InvalidExtError),

    #[error(transparent)]
    Symbol(#[from] InvalidSymbolError),

    #[error("invalid quoted string: {0}")]
    Quoted(#[source] ValueError),

    #[error("\"{0}\" is not a valid package path")]
    PackagePath(String),

    /// Any other malformed value (versions, module paths).
    #[error("{0}")]
    Invalid(String),
}

impl DirectiveError {
    pub(crate) fn semantic(msg: impl Into<String>) -> Self {
        DirectiveError::Semantic(msg.into())
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        DirectiveError::Invalid(msg.into())
    }
}

/// A directive error tagged with its location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ManifestError {
    pub file: String,
    pub pos: Position,
    #[source]
    pub err: DirectiveError,
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_pos(f, &self.file, self.pos)?;
        write!(f, ": {}", self.err)
    }
}

/// Every directive error found in one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
pub struct ErrorList(pub Vec<ManifestError>);

impl ErrorList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManifestError> {
        self.0.iter()
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", e)?;
        }
        Ok(())
    }
}

/// Failure to parse a manifest file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Directives(#[from] ErrorList),
}

impl ParseError {
    /// The individual directive errors, if any.
    pub fn directive_errors(&self) -> &[ManifestError] {
        match self {
            ParseError::Directives(list) => &list.0,
            ParseError::Syntax(_) => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_position_format() {
        let at = |line, col| Position { line, col, byte: 0 };
        let list = ErrorList(vec![
            ManifestError {
                file: "gox.mod".into(),
                pos: at(2, 1),
                err: DirectiveError::semantic("repeated xgo statement"),
            },
            ManifestError {
                file: "gox.mod".into(),
                pos: at(3, 2),
                err: InvalidExtError {
                    ext: "gmx".into(),
                    cause: ValueError::ExtFormat,
                }
                .into(),
            },
        ]);
        assert_eq!(
            list.to_string(),
            "gox.mod:2: repeated xgo statement\ngox.mod:3:2: ext gmx invalid: invalid ext format"
        );
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error as _;

        let err = DirectiveError::from(InvalidSymbolError {
            sym: "game".into(),
            cause: ValueError::SymbolFormat,
        });
        assert_eq!(err.to_string(), "symbol game invalid: invalid Go export symbol format");
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("invalid Go export symbol format"));
    }
}
