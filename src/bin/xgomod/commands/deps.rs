//! `xgomod deps` command

use anyhow::Result;
use serde::Serialize;

use crate::cli::DepsArgs;
use xgomod::resolver::VersionMap;
use xgomod::GlobalContext;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DepEntry {
    pub path: String,
    /// Module path, or directory of a local replacement
    pub resolved: String,
    /// Empty for a local replacement
    pub version: String,
    pub class: bool,
}

/// The entries of `deps`, marking the classfile modules in `class_mods`.
pub fn dep_entries(deps: &VersionMap, class_mods: &[&str]) -> Vec<DepEntry> {
    deps.iter()
        .map(|(path, mv)| DepEntry {
            path: path.to_string(),
            resolved: mv.path.clone(),
            version: mv.version.clone(),
            class: class_mods.contains(&path),
        })
        .collect()
}

pub fn execute(ctx: &GlobalContext, args: DepsArgs) -> Result<()> {
    let module = ctx.load_module()?;
    let entries = dep_entries(&module.dep_mods(), &module.class_mods());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for e in &entries {
        let target = if e.version.is_empty() {
            format!("=> {}", e.resolved)
        } else if e.resolved != e.path {
            format!("=> {} {}", e.resolved, e.version)
        } else {
            e.version.clone()
        };
        let marker = if e.class { " (classfile)" } else { "" };
        println!("{} {}{}", e.path, target, marker);
    }
    Ok(())
}
