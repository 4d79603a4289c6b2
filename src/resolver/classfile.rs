//! The classfile registry: which project handles which file extension.
//!
//! A registry is built from three layers, each overwriting the bindings of
//! the previous one on collision:
//!
//! 1. the built-in projects (`_test.gox`, `.gsh`, `.spx` and the legacy
//!    `.gmx`),
//! 2. the projects declared in the module's own `gox.mod`,
//! 3. the projects of every imported classfile module, in import order.
//!
//! Only one level of classfile imports is followed: the imports of an
//! imported classfile module are not.

use std::collections::HashMap;

use tracing::debug;

use crate::core::ext::class_ext;
use crate::core::manifest::{Project, WorkClass};
use crate::core::module::Module;
use crate::resolver::errors::ResolveError;
use crate::resolver::locator::PackageLocator;

/// The built-in projects, in registration order.
pub fn builtin_projects() -> Vec<Project> {
    vec![
        Project::new(
            "_test.gox",
            "App",
            ["github.com/goplus/xgo/test", "testing"],
        )
        .with_work(WorkClass::new("_test.gox", "Case")),
        Project::new(".gsh", "App", ["github.com/qiniu/x/gsh", "math"]),
        Project::new(".spx", "Game", ["github.com/goplus/spx", "math"])
            .with_work(WorkClass::new(".spx", "Sprite")),
    ]
}

/// Extension of the old style spx project file.
const LEGACY_SPX_EXT: &str = ".gmx";

/// Maps class extensions to the projects that own them.
#[derive(Debug, Clone, Default)]
pub struct ClassfileRegistry {
    projects: Vec<Project>,
    exts: HashMap<String, usize>,
}

impl ClassfileRegistry {
    pub fn new() -> Self {
        ClassfileRegistry::default()
    }

    /// A registry holding only the built-in projects.
    pub fn with_builtins() -> Self {
        let mut reg = ClassfileRegistry::new();
        reg.register_builtins(&mut |_| {});
        reg
    }

    fn register_builtins(&mut self, on_import: &mut dyn FnMut(&Project)) {
        for proj in builtin_projects() {
            self.register(proj, on_import);
        }
        if let Some(spx) = self.exts.get(".spx").copied() {
            self.exts.insert(LEGACY_SPX_EXT.to_string(), spx);
        }
    }

    /// Bind the project's own extension and every work class extension
    /// to `proj`, then report it to `on_import`. A bare package
    /// aggregation has no extension to bind.
    pub fn register(&mut self, proj: Project, on_import: &mut dyn FnMut(&Project)) {
        let idx = self.projects.len();
        if !proj.ext.is_empty() {
            self.exts.insert(proj.ext.clone(), idx);
        }
        for work in &proj.works {
            self.exts.insert(work.ext.clone(), idx);
        }
        on_import(&proj);
        self.projects.push(proj);
    }

    /// The project owning `ext`.
    pub fn lookup_class(&self, ext: &str) -> Option<&Project> {
        self.exts.get(ext).map(|&i| &self.projects[i])
    }

    pub fn is_class(&self, ext: &str) -> bool {
        self.exts.contains_key(ext)
    }

    /// Classify a file name. Returns `None` if no project handles it,
    /// otherwise whether it is the project file.
    pub fn class_kind(&self, fname: &str) -> Option<bool> {
        let ext = class_ext(fname);
        self.lookup_class(ext).map(|proj| proj.is_proj(ext, fname))
    }

    /// Every registered project, in registration order. A project that
    /// lost all its extensions to later ones is still listed.
    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter()
    }

    /// Extensions and the class of the project owning each, sorted by
    /// extension.
    pub fn bindings(&self) -> Vec<(&str, &Project)> {
        let mut out: Vec<_> = self
            .exts
            .iter()
            .map(|(ext, &i)| (ext.as_str(), &self.projects[i]))
            .collect();
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }
}

/// Build the classfile registry of `module`.
pub fn build_registry(
    module: &Module,
    locator: &PackageLocator,
) -> Result<ClassfileRegistry, ResolveError> {
    build_registry_with(module, locator, &mut |_| {})
}

/// Build the classfile registry of `module`, calling `on_import` for every
/// project as it is registered.
pub fn build_registry_with(
    module: &Module,
    locator: &PackageLocator,
    on_import: &mut dyn FnMut(&Project),
) -> Result<ClassfileRegistry, ResolveError> {
    let mut reg = ClassfileRegistry::new();
    reg.register_builtins(on_import);
    for proj in module.projects() {
        reg.register(proj.clone(), on_import);
    }
    for class_mod in module.class_mods() {
        import_class_mod(&mut reg, class_mod, locator, on_import)?;
    }
    Ok(reg)
}

fn import_class_mod(
    reg: &mut ClassfileRegistry,
    mod_path: &str,
    locator: &PackageLocator,
    on_import: &mut dyn FnMut(&Project),
) -> Result<(), ResolveError> {
    let resolved = locator
        .lookup_dep_mod(mod_path)
        .ok_or_else(|| ResolveError::NotFound {
            module: mod_path.to_string(),
        })?;
    let dep = locator.load_module(resolved)?;
    if !dep.has_project() {
        return Err(ResolveError::NotClassfileModule {
            module: mod_path.to_string(),
        });
    }
    debug!(
        "importing {} classfile project(s) from {}",
        dep.projects().len(),
        resolved
    );
    for proj in dep.opt.projects {
        reg.register(proj, on_import);
    }
    Ok(())
}
