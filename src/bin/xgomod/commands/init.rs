//! `xgomod init` command

use anyhow::{anyhow, Result};

use crate::cli::InitArgs;
use xgomod::core::module_path::check_path;
use xgomod::core::Module;
use xgomod::util::fs::ensure_dir;
use xgomod::GlobalContext;

/// Validates a module path for `go.mod`.
pub fn validate_module_path(path: &str) -> Result<()> {
    check_path(path).map_err(|e| anyhow!(e))
}

pub fn execute(ctx: &GlobalContext, args: InitArgs) -> Result<()> {
    validate_module_path(&args.module_path)?;

    let dir = match &args.path {
        Some(p) => ctx.cwd().join(p),
        None => ctx.cwd().to_path_buf(),
    };
    ensure_dir(&dir)?;

    let go_version = args.go_version.as_deref().unwrap_or("");
    let module = Module::create(&dir, &args.module_path, go_version, "")?;
    module.save()?;

    eprintln!("{:>12} go.mod for `{}`", "Created", args.module_path);
    Ok(())
}
