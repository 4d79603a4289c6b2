//! `gox.mod` manifest schema and directive parsing.
//!
//! The secondary manifest sits next to `go.mod` and declares classfile
//! projects:
//!
//! ```text
//! xgo 1.5
//! project .gmx Game github.com/goplus/spx math
//! class -embed .spx Sprite
//! import github.com/goplus/yap
//! ```
//!
//! `gop.mod` is the legacy name of the same file and `gop` the legacy verb
//! of the version directive.

use crate::core::errors::{DirectiveError, ErrorList, ManifestError, ParseError};
use crate::core::ext::{
    is_ext_token, parse_ext, parse_pkg_path, parse_pkg_paths, parse_string, parse_symbol,
};
use crate::core::gomod::is_go_version;
use crate::core::module_path::check_path;
use crate::core::syntax::{self, Entry, FileSyntax, LineRef, Position, SyntaxError};

/// Preferred secondary manifest file name.
pub const GOX_MOD: &str = "gox.mod";

/// Legacy secondary manifest file name.
pub const GOP_MOD: &str = "gop.mod";

const PROJECT_USAGE: &str = "usage: project [.projExt ProjClass] classFilePkgPath ...";
const CLASS_USAGE: &str = "usage: class [-embed -prefix=Prefix] .workExt WorkClass [WorkPrototype]";
const IMPORT_USAGE: &str = "usage: import [name] pkgPath";
const RUNNER_USAGE: &str = "usage: runner runnerPkgPath [version]";

/// The `xgo` (or legacy `gop`) version statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionStmt {
    pub verb: String,
    pub version: String,
    pub at: LineRef,
}

/// A classfile module registered at top level with `import` or `register`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassModImport {
    pub path: String,
    pub at: LineRef,
}

/// A package imported automatically into every file of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub name: Option<String>,
    pub path: String,
}

/// Custom runner of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Runner {
    pub path: String,
    pub version: Option<String>,
}

/// A work class, declared by the `class` directive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkClass {
    /// Canonical extension, e.g. `.spx` or `_yap.gox`.
    pub ext: String,
    /// Extension as written, e.g. `*.spx`.
    pub full_ext: String,
    pub class: String,
    /// Prototype class shared by work classes of one extension.
    pub proto: Option<String>,
    /// Prefix of generated identifiers.
    pub prefix: String,
    /// Whether instances are embedded into the project class.
    pub embedded: bool,
    pub pos: Position,
}

impl WorkClass {
    pub fn new(ext: impl Into<String>, class: impl Into<String>) -> Self {
        let ext = ext.into();
        WorkClass {
            full_ext: ext.clone(),
            ext,
            class: class.into(),
            ..Default::default()
        }
    }
}

/// A classfile project, declared by the `project` directive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    /// Canonical extension; empty for a bare package aggregation.
    pub ext: String,
    pub full_ext: String,
    /// Project class name; empty for a bare package aggregation.
    pub class: String,
    pub works: Vec<WorkClass>,
    /// The classfile package followed by any further packages.
    pub pkg_paths: Vec<String>,
    pub imports: Vec<Import>,
    pub runner: Option<Runner>,
    pub pos: Position,
}

impl Project {
    pub fn new<I, S>(ext: impl Into<String>, class: impl Into<String>, pkg_paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ext = ext.into();
        Project {
            full_ext: ext.clone(),
            ext,
            class: class.into(),
            pkg_paths: pkg_paths.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_work(mut self, work: WorkClass) -> Self {
        self.works.push(work);
        self
    }

    /// The classfile package of this project.
    pub fn pkg_path(&self) -> Option<&str> {
        self.pkg_paths.first().map(String::as_str)
    }

    /// Report whether `fname` with class extension `ext` is the
    /// project-level file.
    ///
    /// Files whose extension belongs to a work class are work files, except
    /// `main<ext>` when the project shares that extension.
    pub fn is_proj(&self, ext: &str, fname: &str) -> bool {
        match self.works.iter().find(|w| w.ext == ext) {
            Some(_) => ext == self.ext && fname.strip_prefix("main") == Some(ext),
            None => true,
        }
    }
}

/// A parsed `gox.mod`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub xgo: Option<VersionStmt>,
    pub projects: Vec<Project>,
    pub imports: Vec<ClassModImport>,
    pub syntax: FileSyntax,
}

impl Manifest {
    /// An empty manifest named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Manifest {
            xgo: None,
            projects: Vec::new(),
            imports: Vec::new(),
            syntax: FileSyntax::new(name),
        }
    }

    /// Parse a manifest.
    ///
    /// In strict mode unknown directives are errors; otherwise they are
    /// skipped. Every directive error in the file is reported at once.
    pub fn parse(name: &str, data: &[u8], strict: bool) -> Result<Manifest, ParseError> {
        let text = std::str::from_utf8(data).map_err(|e| SyntaxError {
            file: name.to_string(),
            pos: Position {
                line: 1,
                col: 1,
                byte: e.valid_up_to(),
            },
            msg: "invalid UTF-8".to_string(),
        })?;
        let (manifest, errors) = Self::from_syntax(syntax::parse(name, text)?, strict);
        if !errors.is_empty() {
            return Err(ErrorList(errors).into());
        }
        Ok(manifest)
    }

    pub(crate) fn from_syntax(syntax: FileSyntax, strict: bool) -> (Manifest, Vec<ManifestError>) {
        let mut parser = DirectiveParser::new(strict);
        let errors = syntax
            .entries()
            .filter_map(|entry| {
                parser.apply(&entry).err().map(|err| ManifestError {
                    file: syntax.name().to_string(),
                    pos: entry.line.start(),
                    err,
                })
            })
            .collect();
        let manifest = Manifest {
            xgo: parser.xgo,
            projects: parser.projects,
            imports: parser.imports,
            syntax,
        };
        (manifest, errors)
    }

    /// Parse a manifest of the main module.
    pub fn parse_strict(name: &str, data: &[u8]) -> Result<Manifest, ParseError> {
        Self::parse(name, data, true)
    }

    /// Parse a manifest of a dependency module.
    pub fn parse_lax(name: &str, data: &[u8]) -> Result<Manifest, ParseError> {
        Self::parse(name, data, false)
    }

    pub fn version(&self) -> Option<&str> {
        self.xgo.as_ref().map(|v| v.version.as_str())
    }

    /// Module paths registered as classfile modules.
    pub fn class_mods(&self) -> impl Iterator<Item = &str> {
        self.imports.iter().map(|i| i.path.as_str())
    }
}

/// Directive verbs understood in a `gox.mod`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directive {
    Version,
    Project,
    Class,
    Import,
    Register,
    Runner,
    Unknown,
}

const DIRECTIVES: &[(&str, Directive)] = &[
    ("xgo", Directive::Version),
    ("gop", Directive::Version),
    ("project", Directive::Project),
    ("class", Directive::Class),
    ("import", Directive::Import),
    ("register", Directive::Register),
    ("runner", Directive::Runner),
];

impl Directive {
    fn lookup(verb: &str) -> Directive {
        DIRECTIVES
            .iter()
            .find(|(v, _)| *v == verb)
            .map(|(_, d)| *d)
            .unwrap_or(Directive::Unknown)
    }
}

/// Interprets statements one at a time.
///
/// `current` is the project that `class`, `import` and `runner` attach to:
/// the most recent `project` statement.
struct DirectiveParser {
    strict: bool,
    xgo: Option<VersionStmt>,
    projects: Vec<Project>,
    imports: Vec<ClassModImport>,
    current: Option<usize>,
}

impl DirectiveParser {
    fn new(strict: bool) -> Self {
        DirectiveParser {
            strict,
            xgo: None,
            projects: Vec::new(),
            imports: Vec::new(),
            current: None,
        }
    }

    fn apply(&mut self, entry: &Entry<'_>) -> Result<(), DirectiveError> {
        let args = entry.args;
        let pos = entry.line.start();
        match Directive::lookup(entry.verb) {
            Directive::Version => self.version(entry.verb, args, entry.at),
            Directive::Project => self.project(args, pos),
            Directive::Class => self.class(args, pos),
            Directive::Import if self.current.is_none() && args.len() == 1 => {
                self.class_mod(entry.verb, args, entry.at)
            }
            Directive::Import => self.import(args),
            Directive::Register => self.class_mod(entry.verb, args, entry.at),
            Directive::Runner => self.runner(args),
            Directive::Unknown if self.strict => Err(DirectiveError::semantic(format!(
                "unknown directive: {}",
                entry.verb
            ))),
            Directive::Unknown => Ok(()),
        }
    }

    fn current_project(&mut self, what: &str) -> Result<&mut Project, DirectiveError> {
        match self.current {
            Some(idx) => Ok(&mut self.projects[idx]),
            None => Err(DirectiveError::semantic(format!(
                "{} must declare after a project definition",
                what
            ))),
        }
    }

    fn version(&mut self, verb: &str, args: &[String], at: LineRef) -> Result<(), DirectiveError> {
        if self.xgo.is_some() {
            return Err(DirectiveError::semantic(format!("repeated {} statement", verb)));
        }
        if args.len() != 1 {
            return Err(DirectiveError::semantic(format!(
                "{} directive expects exactly one argument",
                verb
            )));
        }
        if !is_go_version(&args[0]) {
            return Err(DirectiveError::invalid(format!(
                "invalid {} version '{}': must match format 1.23",
                verb, args[0]
            )));
        }
        self.xgo = Some(VersionStmt {
            verb: verb.to_string(),
            version: args[0].clone(),
            at,
        });
        Ok(())
    }

    fn project(&mut self, args: &[String], pos: Position) -> Result<(), DirectiveError> {
        let Some(first) = args.first() else {
            return Err(DirectiveError::semantic(PROJECT_USAGE));
        };

        let project = if is_ext_token(first, true) {
            if args.len() < 3 || args[1].contains('/') {
                return Err(DirectiveError::semantic(PROJECT_USAGE));
            }
            let (ext, full_ext) = parse_ext(first, true)?;
            let class = parse_symbol(&args[1])?;
            Project {
                ext,
                full_ext,
                class,
                pkg_paths: parse_pkg_paths(&args[2..])?,
                pos,
                ..Default::default()
            }
        } else {
            Project {
                pkg_paths: parse_pkg_paths(args)?,
                pos,
                ..Default::default()
            }
        };

        self.projects.push(project);
        self.current = Some(self.projects.len() - 1);
        Ok(())
    }

    fn class(&mut self, args: &[String], pos: Position) -> Result<(), DirectiveError> {
        let proj = self.current_project("work class")?;

        let mut work = WorkClass {
            pos,
            ..Default::default()
        };
        let mut rest = args;
        while let Some(flag) = rest.first().filter(|a| a.starts_with('-')) {
            if flag == "-embed" {
                work.embedded = true;
            } else if let Some(prefix) = flag.strip_prefix("-prefix=") {
                work.prefix = parse_string(prefix).map_err(DirectiveError::Quoted)?;
            } else {
                return Err(DirectiveError::semantic(CLASS_USAGE));
            }
            rest = &rest[1..];
        }
        if rest.len() < 2 || rest.len() > 3 {
            return Err(DirectiveError::semantic(CLASS_USAGE));
        }

        (work.ext, work.full_ext) = parse_ext(&rest[0], false)?;
        work.class = parse_symbol(&rest[1])?;
        if let Some(proto) = rest.get(2) {
            work.proto = Some(parse_symbol(proto)?);
        }
        proj.works.push(work);
        Ok(())
    }

    fn import(&mut self, args: &[String]) -> Result<(), DirectiveError> {
        let proj = self.current_project("import")?;
        let import = match args {
            [path] => Import {
                name: None,
                path: parse_pkg_path(path)?,
            },
            [name, path] => Import {
                name: Some(parse_string(name).map_err(DirectiveError::Quoted)?),
                path: parse_pkg_path(path)?,
            },
            _ => return Err(DirectiveError::semantic(IMPORT_USAGE)),
        };
        proj.imports.push(import);
        Ok(())
    }

    fn class_mod(
        &mut self,
        verb: &str,
        args: &[String],
        at: LineRef,
    ) -> Result<(), DirectiveError> {
        if args.len() != 1 {
            return Err(DirectiveError::semantic(format!(
                "{} directive expects exactly one argument",
                verb
            )));
        }
        let path = parse_string(&args[0]).map_err(DirectiveError::Quoted)?;
        check_path(&path).map_err(DirectiveError::Invalid)?;
        self.imports.push(ClassModImport { path, at });
        Ok(())
    }

    fn runner(&mut self, args: &[String]) -> Result<(), DirectiveError> {
        let proj = self.current_project("runner")?;
        if proj.runner.is_some() {
            return Err(DirectiveError::semantic("repeated runner statement"));
        }
        let runner = match args {
            [path] => Runner {
                path: parse_pkg_path(path)?,
                version: None,
            },
            [path, version] => Runner {
                path: parse_pkg_path(path)?,
                version: Some(parse_string(version).map_err(DirectiveError::Quoted)?),
            },
            _ => return Err(DirectiveError::semantic(RUNNER_USAGE)),
        };
        proj.runner = Some(runner);
        Ok(())
    }
}
