//! `xgomod scan` command

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::{DirEntry, WalkDir};

use crate::cli::ScanArgs;
use xgomod::resolver::ClassfileRegistry;
use xgomod::GlobalContext;

/// A classified file.
#[derive(Debug, PartialEq, Eq)]
pub struct ScannedFile {
    /// Path relative to the scanned directory
    pub path: PathBuf,
    /// `Some(true)` for a project file, `Some(false)` for a work file
    pub kind: Option<bool>,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|s| s.starts_with('.') || s.starts_with('_'))
}

/// Classify every file under `dir`, skipping hidden and `_` directories
/// as the Go tool does.
pub fn scan_dir(reg: &ClassfileRegistry, dir: &Path) -> Result<Vec<ScannedFile>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && is_hidden(e)));
    for entry in walker {
        let entry = entry.with_context(|| format!("failed to scan {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let fname = entry.file_name().to_string_lossy();
        let path = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        files.push(ScannedFile {
            path: path.to_path_buf(),
            kind: reg.class_kind(&fname),
        });
    }
    Ok(files)
}

pub fn execute(ctx: &GlobalContext, args: ScanArgs) -> Result<()> {
    let module = super::module_or_default(ctx)?;
    let reg = super::registry(ctx, &module)?;

    let dir = match (&args.path, module.root()) {
        (Some(p), _) => ctx.cwd().join(p),
        (None, Some(root)) => root.to_path_buf(),
        (None, None) => ctx.cwd().to_path_buf(),
    };

    let files = scan_dir(&reg, &dir)?;
    let mut classes = 0;
    for f in &files {
        let kind = match f.kind {
            Some(true) => "project",
            Some(false) => "work",
            None if args.all => "-",
            None => continue,
        };
        classes += usize::from(f.kind.is_some());
        println!("{}\t{}", f.path.display(), kind);
    }
    tracing::info!("{} class files in {} files", classes, files.len());
    Ok(())
}
