//! `xgomod fmt` command

use anyhow::{bail, Result};

use crate::cli::FmtArgs;
use xgomod::core::{GoMod, Manifest, ModuleError, ParseError, Workspace};
use xgomod::util::fs::{read_to_string, write_string};
use xgomod::util::ManifestSourceError;
use xgomod::GlobalContext;

/// What happened to one manifest.
#[derive(Debug, PartialEq, Eq)]
pub enum FmtOutcome {
    Unchanged,
    /// The file needs rewriting; holds the canonical text.
    Changed(String),
    Invalid,
}

/// Parse `text` as the manifest `name` and render it back, printing
/// every problem found.
pub fn format_manifest(name: &str, text: &str, is_gomod: bool, strict: bool) -> FmtOutcome {
    let formatted: Result<String, ParseError> = if is_gomod {
        GoMod::parse(name, text.as_bytes()).map(|f| f.format())
    } else {
        Manifest::parse(name, text.as_bytes(), strict).map(|m| m.format())
    };

    match formatted {
        Ok(out) if out == text => FmtOutcome::Unchanged,
        Ok(out) => FmtOutcome::Changed(out),
        Err(err) => {
            for diag in ManifestSourceError::from_parse(&err, text) {
                eprintln!("{:?}", miette::Report::new(diag));
            }
            FmtOutcome::Invalid
        }
    }
}

pub fn execute(ctx: &GlobalContext, args: FmtArgs) -> Result<()> {
    let ws = Workspace::find(ctx.cwd()).ok_or_else(|| ModuleError::NoModRoot {
        dir: ctx.cwd().to_path_buf(),
    })?;

    let mut failed = 0;
    for (path, is_gomod) in [(ws.modfile(), true), (ws.opt_file(), false)] {
        if !is_gomod && !path.exists() {
            continue;
        }
        let text = read_to_string(path)?;
        let name = path.strip_prefix(ctx.cwd()).unwrap_or(path).display().to_string();
        match format_manifest(&name, &text, is_gomod, args.strict) {
            FmtOutcome::Unchanged => tracing::debug!("{} is formatted", path.display()),
            FmtOutcome::Changed(_) if args.check => {
                eprintln!("{} is not formatted", path.display());
                failed += 1;
            }
            FmtOutcome::Changed(out) => {
                write_string(path, &out)?;
                eprintln!("{:>12} {}", "Formatted", path.display());
            }
            FmtOutcome::Invalid => failed += 1,
        }
    }

    if failed > 0 {
        bail!("{} manifest(s) failed the check", failed);
    }
    Ok(())
}
