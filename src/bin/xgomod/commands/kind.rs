//! `xgomod kind` command

use anyhow::Result;

use crate::cli::KindArgs;
use xgomod::resolver::ClassfileRegistry;
use xgomod::GlobalContext;

/// How a file is compiled.
pub fn describe(reg: &ClassfileRegistry, fname: &str) -> &'static str {
    match reg.class_kind(fname) {
        Some(true) => "project",
        Some(false) => "work",
        None => "-",
    }
}

pub fn execute(ctx: &GlobalContext, args: KindArgs) -> Result<()> {
    let module = super::module_or_default(ctx)?;
    let reg = super::registry(ctx, &module)?;
    for file in &args.files {
        let fname = file.rsplit(['/', '\\']).next().unwrap_or(file);
        println!("{}\t{}", file, describe(&reg, fname));
    }
    Ok(())
}
