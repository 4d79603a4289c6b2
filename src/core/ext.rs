//! Classfile extension tokens and directive argument values.
//!
//! An extension token names the files a classfile applies to. It is either
//! a plain extension (`.spx`), a `_suffix.gox` form (`_yap.gox`), either
//! of those starred (`*.spx`), or, in a `project` directive, prefixed with
//! `main` to mark the single project-level file (`main.spx`).

use std::sync::LazyLock;

use regex::Regex;

use crate::core::errors::{DirectiveError, InvalidExtError, InvalidSymbolError, ValueError};
use crate::core::syntax::unquote;

static SYMBOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*?[A-Z]\w*$").expect("symbol pattern is valid"));

/// File suffix that carries a compound class extension in its stem.
pub const GOX_EXT: &str = ".gox";

/// Report whether `token` has the shape of an extension token.
pub fn is_ext_token(token: &str, allow_main: bool) -> bool {
    let b = token.as_bytes();
    (b.len() > 1 && matches!(b[0], b'*' | b'_' | b'.'))
        || (allow_main && b.len() > 4 && token.starts_with("main") && matches!(b[4], b'_' | b'.'))
}

/// Strip a leading `*` or `main` marker from an extension token.
pub fn canonical_ext(token: &str) -> &str {
    if token.len() > 1 {
        if let Some(rest) = token.strip_prefix('*') {
            return rest;
        }
    }
    if token.len() > 4 {
        if let Some(rest) = token.strip_prefix("main") {
            return rest;
        }
    }
    token
}

/// Interpret a directive argument.
///
/// Tokens starting with `"` are unquoted; any other token containing a
/// quote character is rejected.
pub fn parse_string(token: &str) -> Result<String, ValueError> {
    if token.starts_with('"') {
        Ok(unquote(token)?)
    } else if token.contains(['"', '\'', '`']) {
        Err(ValueError::StrayQuote)
    } else {
        Ok(token.to_string())
    }
}

/// Parse an extension token into `(ext, full_ext)`.
pub fn parse_ext(token: &str, is_proj: bool) -> Result<(String, String), InvalidExtError> {
    let invalid = |cause| InvalidExtError {
        ext: token.to_string(),
        cause,
    };
    let t = parse_string(token).map_err(invalid)?;
    if !is_ext_token(&t, is_proj) {
        return Err(invalid(ValueError::ExtFormat));
    }
    Ok((canonical_ext(&t).to_string(), t))
}

/// Parse an exported symbol, optionally starred.
pub fn parse_symbol(token: &str) -> Result<String, InvalidSymbolError> {
    let invalid = |cause| InvalidSymbolError {
        sym: token.to_string(),
        cause,
    };
    let t = parse_string(token).map_err(invalid)?;
    if SYMBOL_RE.is_match(&t) {
        Ok(t)
    } else {
        Err(invalid(ValueError::SymbolFormat))
    }
}

fn is_pkg_path(s: &str) -> bool {
    !s.is_empty() && !s.starts_with(['.', '_'])
}

/// Parse a package path argument.
pub fn parse_pkg_path(token: &str) -> Result<String, DirectiveError> {
    let path = parse_string(token).map_err(DirectiveError::Quoted)?;
    if !is_pkg_path(&path) {
        return Err(DirectiveError::PackagePath(path));
    }
    Ok(path)
}

/// Parse every token as a package path.
pub fn parse_pkg_paths(tokens: &[String]) -> Result<Vec<String>, DirectiveError> {
    tokens.iter().map(|t| parse_pkg_path(t)).collect()
}

/// Split a file name into `(class_name, class_ext)`.
///
/// For `.gox` files the extension extends back to the last `_` of the stem,
/// so `foo_yap.gox` splits into `foo` and `_yap.gox`.
pub fn split_fname(fname: &str) -> (&str, &str) {
    let dot = fname
        .rfind(['.', '/'])
        .filter(|&i| fname.as_bytes()[i] == b'.')
        .unwrap_or(fname.len());
    let (mut name, mut ext) = fname.split_at(dot);
    if ext == GOX_EXT {
        if let Some(n) = name.rfind('_').filter(|&n| n > 0) {
            (name, ext) = fname.split_at(n);
        }
    }
    (name, ext)
}

/// The class extension of a file name.
pub fn class_ext(fname: &str) -> &str {
    split_fname(fname).1
}
