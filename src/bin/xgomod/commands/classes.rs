//! `xgomod classes` command

use anyhow::Result;
use serde::Serialize;

use crate::cli::ClassesArgs;
use xgomod::resolver::ClassfileRegistry;
use xgomod::GlobalContext;

/// One extension binding, as printed.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Binding {
    pub ext: String,
    /// Project class
    pub project: String,
    /// Work class declared for this extension, if any
    pub work: Option<String>,
    /// Classfile package
    pub pkg: String,
}

/// Every binding of `reg`, sorted by extension.
pub fn collect_bindings(reg: &ClassfileRegistry) -> Vec<Binding> {
    reg.bindings()
        .into_iter()
        .map(|(ext, proj)| Binding {
            ext: ext.to_string(),
            project: proj.class.clone(),
            work: proj
                .works
                .iter()
                .find(|w| w.ext == ext)
                .map(|w| w.class.clone()),
            pkg: proj.pkg_path().unwrap_or_default().to_string(),
        })
        .collect()
}

pub fn execute(ctx: &GlobalContext, args: ClassesArgs) -> Result<()> {
    let module = super::module_or_default(ctx)?;
    let reg = super::registry(ctx, &module)?;
    let bindings = collect_bindings(&reg);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&bindings)?);
        return Ok(());
    }

    for b in &bindings {
        let class = match &b.work {
            Some(work) if *work != b.project => format!("{} ({})", b.project, work),
            _ => b.project.clone(),
        };
        println!("{:<12} {:<20} {}", b.ext, class, b.pkg);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_bindings() {
        let bindings = collect_bindings(&ClassfileRegistry::with_builtins());
        let exts: Vec<_> = bindings.iter().map(|b| b.ext.as_str()).collect();
        assert_eq!(exts, [".gmx", ".gsh", ".spx", "_test.gox"]);

        let spx = &bindings[2];
        assert_eq!(spx.project, "Game");
        assert_eq!(spx.work.as_deref(), Some("Sprite"));
        assert_eq!(spx.pkg, "github.com/goplus/spx");

        let gsh = &bindings[1];
        assert_eq!(gsh.work, None);
    }
}
