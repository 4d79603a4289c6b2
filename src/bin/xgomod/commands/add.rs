//! `xgomod add` command

use anyhow::{bail, Result};
use tracing::warn;

use crate::cli::AddArgs;
use xgomod::core::gomod::is_canonical_version;
use xgomod::core::module_path::check_path;
use xgomod::core::ModuleVersion;
use xgomod::resolver::ResolveError;
use xgomod::GlobalContext;

/// Split `path@version`. The version is `None` when absent.
pub fn split_module_query(module: &str) -> (&str, Option<&str>) {
    match module.split_once('@') {
        Some((path, version)) => (path, Some(version)),
        None => (module, None),
    }
}

pub fn execute(ctx: &GlobalContext, args: AddArgs) -> Result<()> {
    let mut module = ctx.load_module()?;

    let (path, query) = split_module_query(&args.module);
    if let Err(e) = check_path(path) {
        bail!(e);
    }

    // Queries such as `latest` or a branch name are resolved by the fetcher.
    let version = match query {
        Some(v) if is_canonical_version(v) => v.to_string(),
        _ => {
            let fetched = ctx.fetcher().fetch(&args.module).map_err(|source| {
                ResolveError::Fetch {
                    module: args.module.clone(),
                    source,
                }
            })?;
            fetched.version
        }
    };

    module.add_require(path, &version, false)?;

    let locator = ctx.locator(&module)?;
    let resolved = locator
        .lookup_dep_mod(path)
        .cloned()
        .unwrap_or_else(|| ModuleVersion::new(path, version.as_str()));
    let has_proj = match locator.load_module(&resolved) {
        Ok(dep) => dep.has_project(),
        Err(e) if !args.class => {
            warn!("cannot inspect {}: {}", resolved, e);
            false
        }
        Err(e) => return Err(e.into()),
    };
    if args.class && !has_proj {
        return Err(ResolveError::NotClassfileModule {
            module: path.to_string(),
        }
        .into());
    }
    if has_proj {
        module.add_require(path, &version, true)?;
    }
    module.save()?;

    let kind = if has_proj { "classfile module" } else { "module" };
    eprintln!("{:>12} {} {} {}", "Added", kind, path, version);
    Ok(())
}
