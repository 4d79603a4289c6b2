//! Command implementations

pub mod add;
pub mod classes;
pub mod deps;
pub mod fmt;
pub mod init;
pub mod kind;
pub mod lookup;
pub mod scan;

use anyhow::Result;

use xgomod::core::{Module, ModuleError};
use xgomod::resolver::{build_registry, ClassfileRegistry, ResolveError};
use xgomod::util::diagnostic::emit;
use xgomod::GlobalContext;

/// Print a fatal error, with suggestions when the error knows any.
pub fn report(err: &anyhow::Error, color: bool) {
    if let Some(e) = err.downcast_ref::<ModuleError>() {
        emit(&e.to_diagnostic(), color);
    } else if let Some(e) = err.downcast_ref::<ResolveError>() {
        emit(&e.to_diagnostic(), color);
    } else {
        eprintln!("error: {:#}", err);
    }
}

/// The module containing the working directory, or the default module
/// when there is none.
pub fn module_or_default(ctx: &GlobalContext) -> Result<Module> {
    match ctx.load_module() {
        Ok(module) => Ok(module),
        Err(ModuleError::NoModRoot { .. }) => {
            tracing::debug!("no go.mod found; using the default module");
            Ok(Module::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// The classfile registry of `module`.
pub fn registry(ctx: &GlobalContext, module: &Module) -> Result<ClassfileRegistry> {
    let locator = ctx.locator(module)?;
    Ok(build_registry(module, &locator)?)
}
