//! `go.sum` checksum files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// The lines of a `go.sum`, kept sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SumFile {
    lines: Vec<String>,
    path: PathBuf,
}

impl SumFile {
    /// Load `path`. A missing file is an empty checksum file.
    pub fn load(path: &Path) -> Result<Self> {
        let lines = match fs::read_to_string(path) {
            Ok(text) => {
                let text = text.trim_end_matches('\n');
                if text.is_empty() {
                    Vec::new()
                } else {
                    text.split('\n').map(str::to_string).collect()
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()))
            }
        };
        Ok(SumFile {
            lines,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Every checksum line of module `mod_path`.
    pub fn lookup(&self, mod_path: &str) -> &[String] {
        let prefix = format!("{} ", mod_path);
        let Some(start) = self.lines.iter().position(|l| l.as_str() > prefix.as_str()) else {
            return &[];
        };
        let run = self.lines[start..]
            .iter()
            .take_while(|l| l.starts_with(&prefix))
            .count();
        &self.lines[start..start + run]
    }

    pub fn add<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        self.lines.sort();
    }

    pub fn save(&self) -> Result<()> {
        let mut out = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        fs::write(&self.path, out)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SUMS: &str = "\
github.com/goplus/spx v1.0.0 h1:aaa=
github.com/goplus/spx v1.0.0/go.mod h1:bbb=
github.com/goplus/spx2 v0.1.0 h1:ccc=
github.com/goplus/yap v0.7.2 h1:ddd=
";

    #[test]
    fn test_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let sums = SumFile::load(&tmp.path().join("go.sum")).unwrap();
        assert!(sums.lines().is_empty());
        assert!(sums.lookup("github.com/goplus/spx").is_empty());
    }

    #[test]
    fn test_lookup() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("go.sum");
        fs::write(&path, SUMS).unwrap();
        let sums = SumFile::load(&path).unwrap();

        assert_eq!(
            sums.lookup("github.com/goplus/spx"),
            [
                "github.com/goplus/spx v1.0.0 h1:aaa=",
                "github.com/goplus/spx v1.0.0/go.mod h1:bbb="
            ]
        );
        assert_eq!(sums.lookup("github.com/goplus/yap").len(), 1);
        assert!(sums.lookup("github.com/goplus/gop").is_empty());
    }

    #[test]
    fn test_add_and_save() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("go.sum");
        let mut sums = SumFile::load(&path).unwrap();
        sums.add(["b.com/x v1.0.0 h1:x=", "a.com/y v1.0.0 h1:y="]);
        sums.save().unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "a.com/y v1.0.0 h1:y=\nb.com/x v1.0.0 h1:x=\n"
        );
    }
}
