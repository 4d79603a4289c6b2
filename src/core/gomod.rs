//! `go.mod` parsing and editing.
//!
//! Only the statements a module manifest can carry are understood:
//! `module`, `go`, `toolchain`, `godebug`, `require`, `exclude`, `replace`,
//! `retract`, `tool` and `ignore`. A `require` line with a `//xgo:class` (or legacy
//! `//gop:class`) comment names a classfile module.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::errors::{DirectiveError, ErrorList, ManifestError, ParseError};
use crate::core::ext::parse_string;
use crate::core::module_path::{check_path, is_directory_path};
use crate::core::syntax::{
    self, auto_quote, Entry, FileSyntax, Line, LineRef, Position, Stmt, SyntaxError,
};

/// Primary manifest file name.
pub const GO_MOD: &str = "go.mod";

/// Comment marking a required module as a classfile module.
pub const CLASS_COMMENT: &str = "//xgo:class";

static GO_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([1-9][0-9]*)\.(0|[1-9][0-9]*)(\.(0|[1-9][0-9]*))?([a-z]+[0-9]+)?$")
        .expect("go version pattern is valid")
});

static TOOLCHAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^default$|^go1($|\.)").expect("toolchain pattern is valid")
});

/// Report whether `v` is a language version such as `1.21` or `1.21rc1`.
pub fn is_go_version(v: &str) -> bool {
    GO_VERSION_RE.is_match(v)
}

/// Report whether `v` is a canonical module version (`v1.2.3`, with
/// optional pre-release and build suffixes).
pub fn is_canonical_version(v: &str) -> bool {
    v.strip_prefix('v')
        .is_some_and(|rest| semver::Version::parse(rest).is_ok())
}

/// A module path with an optional version.
///
/// An empty version marks a local directory replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleVersion {
    pub path: String,
    pub version: String,
}

impl ModuleVersion {
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        ModuleVersion {
            path: path.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{}@{}", self.path, self.version)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleStmt {
    pub path: String,
    pub at: LineRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoStmt {
    pub version: String,
    pub at: LineRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainStmt {
    pub name: String,
    pub at: LineRef,
}

/// A `godebug key=value` setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Godebug {
    pub key: String,
    pub value: String,
    pub at: LineRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Require {
    pub module: ModuleVersion,
    pub indirect: bool,
    /// Marked as a classfile module.
    pub class: bool,
    pub at: LineRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replace {
    pub old: ModuleVersion,
    pub new: ModuleVersion,
    pub at: LineRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclude {
    pub module: ModuleVersion,
    pub at: LineRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retract {
    pub low: String,
    pub high: String,
    pub at: LineRef,
}

/// A package run with `go tool`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    pub path: String,
    pub at: LineRef,
}

/// A directory skipped by package patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ignore {
    pub path: String,
    pub at: LineRef,
}

/// A parsed `go.mod`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoMod {
    pub module: Option<ModuleStmt>,
    pub go: Option<GoStmt>,
    pub toolchain: Option<ToolchainStmt>,
    pub godebug: Vec<Godebug>,
    pub require: Vec<Require>,
    pub exclude: Vec<Exclude>,
    pub replace: Vec<Replace>,
    pub retract: Vec<Retract>,
    pub tool: Vec<Tool>,
    pub ignore: Vec<Ignore>,
    pub syntax: FileSyntax,
}

/// Insertion order of `go.mod` statements.
fn weight(verb: &str) -> u32 {
    match verb {
        "module" => 1,
        "go" => 2,
        "toolchain" => 3,
        "godebug" => 4,
        "require" => 5,
        "exclude" => 6,
        "replace" => 7,
        "retract" => 8,
        "tool" => 9,
        "ignore" => 10,
        _ => 0x80,
    }
}

fn comment_text(c: &str) -> &str {
    c.strip_prefix("//").unwrap_or(c).trim_start_matches([' ', '\t'])
}

fn is_indirect(line: &Line) -> bool {
    line.comments().suffix.iter().any(|c| {
        let text = comment_text(c).trim_end();
        text == "indirect" || text.starts_with("indirect;")
    })
}

fn is_class(line: &Line) -> bool {
    line.comments().suffix.iter().any(|c| {
        let text = comment_text(c);
        text.starts_with("xgo:class") || text.starts_with("gop:class")
    })
}

fn parse_module_path(token: &str) -> Result<String, DirectiveError> {
    let path = parse_string(token).map_err(DirectiveError::Quoted)?;
    check_path(&path).map_err(DirectiveError::Invalid)?;
    Ok(path)
}

fn parse_version(token: &str) -> Result<String, DirectiveError> {
    let v = parse_string(token).map_err(DirectiveError::Quoted)?;
    if !is_canonical_version(&v) {
        return Err(DirectiveError::invalid(format!(
            "version \"{}\" invalid: must be of the form v1.2.3",
            v
        )));
    }
    Ok(v)
}

const REPLACE_USAGE: &str = "usage: replace module/path [v1.2.3] => other/module v1.4\n\t or replace module/path [v1.2.3] => ../local/directory";

impl GoMod {
    /// An empty `go.mod` named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        GoMod::from_syntax(FileSyntax::new(name)).0
    }

    /// Parse a `go.mod`. Every statement error is reported at once.
    pub fn parse(name: &str, data: &[u8]) -> Result<GoMod, ParseError> {
        let text = std::str::from_utf8(data).map_err(|e| SyntaxError {
            file: name.to_string(),
            pos: Position {
                line: 1,
                col: 1,
                byte: e.valid_up_to(),
            },
            msg: "invalid UTF-8".to_string(),
        })?;
        let (file, errors) = GoMod::from_syntax(syntax::parse(name, text)?);
        if !errors.is_empty() {
            return Err(ErrorList(errors).into());
        }
        Ok(file)
    }

    fn from_syntax(syntax: FileSyntax) -> (GoMod, Vec<ManifestError>) {
        let mut file = GoMod {
            module: None,
            go: None,
            toolchain: None,
            godebug: Vec::new(),
            require: Vec::new(),
            exclude: Vec::new(),
            replace: Vec::new(),
            retract: Vec::new(),
            tool: Vec::new(),
            ignore: Vec::new(),
            syntax: FileSyntax::new(syntax.name()),
        };
        let errors = syntax
            .entries()
            .filter_map(|entry| {
                file.apply(&entry).err().map(|err| ManifestError {
                    file: syntax.name().to_string(),
                    pos: entry.line.start(),
                    err,
                })
            })
            .collect();
        file.syntax = syntax;
        (file, errors)
    }

    /// Rebuild the interpreted statements after the tree changed shape.
    fn refresh(&mut self) {
        let syntax = std::mem::replace(&mut self.syntax, FileSyntax::new(""));
        *self = GoMod::from_syntax(syntax).0;
    }

    fn apply(&mut self, entry: &Entry<'_>) -> Result<(), DirectiveError> {
        let args = entry.args;
        let at = entry.at;
        match entry.verb {
            "module" => {
                if self.module.is_some() {
                    return Err(DirectiveError::semantic("repeated module statement"));
                }
                let [path] = args else {
                    return Err(DirectiveError::semantic("usage: module module/path"));
                };
                let path = parse_string(path).map_err(DirectiveError::Quoted)?;
                let path = if path == "std" { String::new() } else { path };
                self.module = Some(ModuleStmt { path, at });
            }
            "go" => {
                if self.go.is_some() {
                    return Err(DirectiveError::semantic("repeated go statement"));
                }
                let [version] = args else {
                    return Err(DirectiveError::semantic(
                        "go directive expects exactly one argument",
                    ));
                };
                if !is_go_version(version) {
                    return Err(DirectiveError::invalid(format!(
                        "invalid go version '{}': must match format 1.23",
                        version
                    )));
                }
                self.go = Some(GoStmt {
                    version: version.clone(),
                    at,
                });
            }
            "toolchain" => {
                if self.toolchain.is_some() {
                    return Err(DirectiveError::semantic("repeated toolchain statement"));
                }
                let [name] = args else {
                    return Err(DirectiveError::semantic(
                        "toolchain directive expects exactly one argument",
                    ));
                };
                if !TOOLCHAIN_RE.is_match(name) {
                    return Err(DirectiveError::invalid(format!(
                        "invalid toolchain version '{}': must match format go1.23.0 or default",
                        name
                    )));
                }
                self.toolchain = Some(ToolchainStmt {
                    name: name.clone(),
                    at,
                });
            }
            "godebug" => {
                let setting = match args {
                    [kv] => kv.split_once('='),
                    _ => None,
                };
                let Some((key, value)) = setting else {
                    return Err(DirectiveError::semantic("usage: godebug key=value"));
                };
                if key.is_empty() || value.is_empty() || key.contains(['"', '`']) {
                    return Err(DirectiveError::invalid(format!(
                        "invalid godebug setting '{}={}'",
                        key, value
                    )));
                }
                self.godebug.push(Godebug {
                    key: key.to_string(),
                    value: value.to_string(),
                    at,
                });
            }
            "tool" => {
                let [path] = args else {
                    return Err(DirectiveError::semantic("usage: tool module/path"));
                };
                let path = parse_module_path(path)?;
                self.tool.push(Tool { path, at });
            }
            "ignore" => {
                let [path] = args else {
                    return Err(DirectiveError::semantic("usage: ignore path"));
                };
                let path = parse_string(path).map_err(DirectiveError::Quoted)?;
                self.ignore.push(Ignore { path, at });
            }
            "require" | "exclude" => {
                let [path, version] = args else {
                    return Err(DirectiveError::semantic(format!(
                        "usage: {} module/path v1.2.3",
                        entry.verb
                    )));
                };
                let module = ModuleVersion::new(parse_module_path(path)?, parse_version(version)?);
                if entry.verb == "require" {
                    self.require.push(Require {
                        module,
                        indirect: is_indirect(entry.line),
                        class: is_class(entry.line),
                        at,
                    });
                } else {
                    self.exclude.push(Exclude { module, at });
                }
            }
            "replace" => {
                let arrow = args
                    .iter()
                    .position(|a| a == "=>")
                    .filter(|&i| i == 1 || i == 2)
                    .ok_or_else(|| DirectiveError::semantic(REPLACE_USAGE))?;
                let old = ModuleVersion {
                    path: parse_module_path(&args[0])?,
                    version: match arrow {
                        2 => parse_version(&args[1])?,
                        _ => String::new(),
                    },
                };
                let new = match &args[arrow + 1..] {
                    [path] => {
                        let path = parse_string(path).map_err(DirectiveError::Quoted)?;
                        if !is_directory_path(&path) {
                            return Err(DirectiveError::invalid(
                                "replacement module without version must be directory path (rooted or starting with ./ or ../)",
                            ));
                        }
                        ModuleVersion::new(path, "")
                    }
                    [path, version] => {
                        ModuleVersion::new(parse_module_path(path)?, parse_version(version)?)
                    }
                    _ => return Err(DirectiveError::semantic(REPLACE_USAGE)),
                };
                self.replace.push(Replace { old, new, at });
            }
            "retract" => {
                let (low, high) = match args {
                    [v] => (parse_version(v)?, parse_version(v)?),
                    [open, low, comma, high, close]
                        if open == "[" && comma == "," && close == "]" =>
                    {
                        (parse_version(low)?, parse_version(high)?)
                    }
                    _ => {
                        return Err(DirectiveError::semantic(
                            "usage: retract version or retract [low, high]",
                        ))
                    }
                };
                self.retract.push(Retract { low, high, at });
            }
            verb => {
                return Err(DirectiveError::semantic(format!("unknown directive: {}", verb)));
            }
        }
        Ok(())
    }

    /// The module path; empty for the standard library.
    pub fn path(&self) -> &str {
        self.module.as_ref().map(|m| m.path.as_str()).unwrap_or("")
    }

    pub fn go_version(&self) -> Option<&str> {
        self.go.as_ref().map(|g| g.version.as_str())
    }

    /// Paths of required modules marked as classfile modules.
    pub fn class_mods(&self) -> impl Iterator<Item = &str> {
        self.require
            .iter()
            .filter(|r| r.class)
            .map(|r| r.module.path.as_str())
    }

    pub fn add_module_stmt(&mut self, path: &str) {
        match &self.module {
            Some(m) => {
                let at = m.at;
                if let Some(line) = self.syntax.line_mut(at) {
                    line.set_token(1, auto_quote(path));
                }
            }
            None => {
                self.syntax
                    .insert_line(vec!["module".into(), auto_quote(path)], weight);
            }
        }
        self.refresh();
    }

    pub fn add_go_stmt(&mut self, version: &str) -> Result<(), DirectiveError> {
        if !is_go_version(version) {
            return Err(DirectiveError::invalid(format!(
                "invalid language version string {:?}",
                version
            )));
        }
        self.set_go_version(version);
        Ok(())
    }

    pub(crate) fn set_go_version(&mut self, version: &str) {
        match &self.go {
            Some(g) => {
                let at = g.at;
                if let Some(line) = self.syntax.line_mut(at) {
                    line.set_token(1, version);
                }
            }
            None => {
                self.syntax
                    .insert_line(vec!["go".into(), version.into()], weight);
            }
        }
        self.refresh();
    }

    /// Require `path` at `version`, updating an existing requirement.
    pub fn add_require(&mut self, path: &str, version: &str) -> Result<(), DirectiveError> {
        check_path(path).map_err(DirectiveError::Invalid)?;
        if !is_canonical_version(version) {
            return Err(DirectiveError::invalid(format!(
                "version \"{}\" invalid: must be of the form v1.2.3",
                version
            )));
        }

        if let Some(r) = self.require.iter().find(|r| r.module.path == path) {
            let at = r.at;
            let idx = if at.line.is_some() { 1 } else { 2 };
            if let Some(line) = self.syntax.line_mut(at) {
                line.set_token(idx, auto_quote(version));
            }
        } else {
            self.add_entry("require", vec![auto_quote(path), auto_quote(version)]);
        }
        self.refresh();
        Ok(())
    }

    /// Mark a required module as a classfile module. Returns false if
    /// `path` is not required.
    pub fn mark_class(&mut self, path: &str) -> bool {
        let Some(r) = self.require.iter_mut().find(|r| r.module.path == path) else {
            return false;
        };
        if !r.class {
            r.class = true;
            if let Some(line) = self.syntax.line_mut(r.at) {
                line.add_suffix_comment(CLASS_COMMENT);
            }
        }
        true
    }

    /// Replace `old` (any version when `old_version` is empty) with `new`.
    pub fn add_replace(
        &mut self,
        old_path: &str,
        old_version: &str,
        new_path: &str,
        new_version: &str,
    ) -> Result<(), DirectiveError> {
        check_path(old_path).map_err(DirectiveError::Invalid)?;
        if !old_version.is_empty() && !is_canonical_version(old_version) {
            return Err(DirectiveError::invalid(format!(
                "version \"{}\" invalid: must be of the form v1.2.3",
                old_version
            )));
        }
        if new_version.is_empty() {
            if !is_directory_path(new_path) {
                return Err(DirectiveError::invalid(
                    "replacement module without version must be directory path (rooted or starting with ./ or ../)",
                ));
            }
        } else {
            check_path(new_path).map_err(DirectiveError::Invalid)?;
            if !is_canonical_version(new_version) {
                return Err(DirectiveError::invalid(format!(
                    "version \"{}\" invalid: must be of the form v1.2.3",
                    new_version
                )));
            }
        }

        let mut tokens = vec![auto_quote(old_path)];
        if !old_version.is_empty() {
            tokens.push(auto_quote(old_version));
        }
        tokens.push("=>".into());
        tokens.push(auto_quote(new_path));
        if !new_version.is_empty() {
            tokens.push(auto_quote(new_version));
        }

        let existing = self
            .replace
            .iter()
            .find(|r| r.old.path == old_path && r.old.version == old_version)
            .map(|r| r.at);
        match existing {
            Some(at) => {
                if at.line.is_none() {
                    tokens.insert(0, "replace".into());
                }
                if let Some(line) = self.syntax.line_mut(at) {
                    line.set_tokens(tokens);
                }
            }
            None => self.add_entry("replace", tokens),
        }
        self.refresh();
        Ok(())
    }

    /// Add an entry for `verb`, joining an existing block (or turning a
    /// single existing line into one) when possible.
    fn add_entry(&mut self, verb: &str, args: Vec<String>) {
        let stmts = self.syntax.stmts();
        let block = stmts
            .iter()
            .position(|s| s.verb() == verb && matches!(s, Stmt::Block(_)));
        let line = stmts
            .iter()
            .position(|s| s.verb() == verb && matches!(s, Stmt::Line(_)));

        let target = match (block, line) {
            (Some(i), _) => self.syntax.block_mut(i),
            (None, Some(i)) => self.syntax.line_to_block(i),
            (None, None) => None,
        };
        match target {
            Some(block) => {
                block.push_line(args);
            }
            None => {
                let mut tokens = vec![verb.to_string()];
                tokens.extend(args);
                self.syntax.insert_line(tokens, weight);
            }
        }
    }

    /// Render the file.
    pub fn format(&self) -> String {
        self.syntax.format()
    }
}
