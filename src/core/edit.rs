//! In-place edits of a `gox.mod`.
//!
//! Edits touch the statement tree directly so that everything the user
//! wrote (comments, spacing, statement order) survives a rewrite.

use crate::core::errors::DirectiveError;
use crate::core::gomod::is_go_version;
use crate::core::manifest::Manifest;
use crate::core::syntax::{auto_quote, FileSyntax};

/// Insertion order of `gox.mod` statements. Only used to place new
/// statements; existing ones are never moved.
pub fn weight(verb: &str) -> u32 {
    match verb {
        "module" => 1,
        "xgo" | "gop" => 2,
        "project" => 3,
        "class" => 4,
        "import" | "register" => 0x81,
        _ => 0x80,
    }
}

impl Manifest {
    /// Set the `xgo` version, adding the statement if it is missing.
    pub fn add_or_update_version(&mut self, version: &str) -> Result<(), DirectiveError> {
        if !is_go_version(version) {
            return Err(DirectiveError::invalid(format!(
                "invalid language version string {:?}",
                version
            )));
        }
        self.set_version(version);
        Ok(())
    }

    /// Set the version without validating it.
    pub(crate) fn set_version(&mut self, version: &str) {
        match &self.xgo {
            Some(stmt) => {
                let at = stmt.at;
                let idx = if at.line.is_some() { 0 } else { 1 };
                if let Some(line) = self.syntax.line_mut(at) {
                    line.set_token(idx, version);
                }
            }
            None => {
                self.syntax
                    .insert_line(vec!["xgo".into(), version.into()], weight);
            }
        }
        self.refresh();
    }

    /// Register `mod_path` as a classfile module unless it already is.
    pub fn add_import(&mut self, mod_path: &str) {
        if self.class_mods().any(|p| p == mod_path) {
            return;
        }
        self.add_new_import(mod_path);
    }

    /// Register `mod_path` as a classfile module.
    ///
    /// New registrations land after every project, where a bare `import`
    /// would bind to the last project instead, so `register` is written
    /// once any project exists.
    pub fn add_new_import(&mut self, mod_path: &str) {
        let verb = if self.projects.is_empty() {
            "import"
        } else {
            "register"
        };
        self.syntax
            .insert_line(vec![verb.into(), auto_quote(mod_path)], weight);
        self.refresh();
    }

    /// Render the file.
    pub fn format(&self) -> String {
        self.syntax.format()
    }

    fn refresh(&mut self) {
        let syntax = std::mem::replace(&mut self.syntax, FileSyntax::new(""));
        *self = Manifest::from_syntax(syntax, false).0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Manifest {
        Manifest::parse_lax("gox.mod", text.as_bytes()).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let inputs = [
            "xgo 1.5\nproject .gmx Game pkgA\nclass .spx Sprite\n",
            "// classfiles\n\ngop 1.2\n\nproject main.spx Game github.com/goplus/spx math // game\n\tclass  .spx   Sprite\n",
            "project .gmx Game pkgA\nimport (\n\tpkgB\n\tx pkgC\n)\n\n// end\n",
        ];
        for input in inputs {
            assert_eq!(parse(input).format(), input);
        }
    }

    #[test]
    fn test_add_version_to_empty() {
        let mut m = Manifest::new("gox.mod");
        m.add_or_update_version("1.5").unwrap();
        assert_eq!(m.format(), "xgo 1.5\n");
        assert_eq!(m.version(), Some("1.5"));
    }

    #[test]
    fn test_add_version_before_projects() {
        let mut m = parse("project .gmx Game pkgA\nclass .spx Sprite\n");
        m.add_or_update_version("1.5").unwrap();
        assert_eq!(
            m.format(),
            "xgo 1.5\n\nproject .gmx Game pkgA\nclass .spx Sprite\n"
        );
        assert_eq!(m.projects.len(), 1);
        assert_eq!(m.projects[0].works.len(), 1);
    }

    #[test]
    fn test_update_version_is_idempotent() {
        let mut once = parse("// header\ngop 1.2 // old\nproject .gmx Game pkgA\n");
        once.add_or_update_version("1.5").unwrap();
        let mut twice = once.clone();
        twice.add_or_update_version("1.5").unwrap();
        assert_eq!(once.format(), twice.format());
        assert_eq!(
            once.format(),
            "// header\ngop 1.5 // old\nproject .gmx Game pkgA\n"
        );
    }

    #[test]
    fn test_add_version_rejects_bad_format() {
        let mut m = Manifest::new("gox.mod");
        assert!(m.add_or_update_version("v1").is_err());
        assert_eq!(m.format(), "");
    }

    #[test]
    fn test_add_import_if_absent() {
        let mut m = parse("xgo 1.5\n");
        m.add_import("github.com/goplus/yap");
        m.add_import("github.com/goplus/yap");
        m.add_import("github.com/goplus/spx");
        assert_eq!(
            m.format(),
            "xgo 1.5\n\nimport github.com/goplus/yap\nimport github.com/goplus/spx\n"
        );
        assert_eq!(m.imports.len(), 2);
    }

    #[test]
    fn test_add_import_after_project_uses_register() {
        let mut m = parse("xgo 1.5\nproject .gmx Game pkgA\n");
        m.add_import("github.com/goplus/yap");
        assert_eq!(
            m.format(),
            "xgo 1.5\nproject .gmx Game pkgA\n\nregister github.com/goplus/yap\n"
        );

        let reparsed = parse(&m.format());
        assert_eq!(reparsed.class_mods().collect::<Vec<_>>(), ["github.com/goplus/yap"]);
        assert!(reparsed.projects[0].imports.is_empty());
    }
}
