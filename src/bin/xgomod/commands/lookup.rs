//! `xgomod lookup` command

use anyhow::Result;

use crate::cli::LookupArgs;
use xgomod::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: LookupArgs) -> Result<()> {
    let module = super::module_or_default(ctx)?;
    let locator = ctx.locator(&module)?;

    for pkg_path in &args.packages {
        if args.id {
            println!("{}", locator.pkg_id(pkg_path)?);
            continue;
        }
        let pkg = locator.lookup(pkg_path)?;
        match &pkg.real {
            Some(real) => println!("{}\t{}\t{}\t{}", pkg_path, pkg.kind, pkg.dir.display(), real),
            None => println!("{}\t{}\t{}", pkg_path, pkg.kind, pkg.dir.display()),
        }
    }
    Ok(())
}
