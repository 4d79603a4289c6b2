//! Line-oriented manifest syntax.
//!
//! Both `go.mod` and `gox.mod` share the same surface grammar: one statement
//! per line, or a parenthesized block of lines sharing a verb. This module
//! parses that grammar into a [`FileSyntax`] tree which remembers the exact
//! source text of every statement, so an unmodified tree formats back to
//! the original bytes. Edited or newly inserted statements are rendered in
//! canonical form.

mod quote;
mod read;

use std::fmt;

use thiserror::Error;

pub use quote::{auto_quote, must_quote, quote, unquote, QuoteError};

/// A position in a manifest. Lines and columns are 1-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub col: usize,
    pub byte: usize,
}

/// Write `file:line:col` (or `file:line` for column 1) as a message prefix.
pub(crate) fn write_pos(f: &mut fmt::Formatter<'_>, file: &str, pos: Position) -> fmt::Result {
    if pos.col > 1 {
        write!(f, "{}:{}:{}", file, pos.line, pos.col)
    } else {
        write!(f, "{}:{}", file, pos.line)
    }
}

/// A malformed manifest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct SyntaxError {
    pub file: String,
    pub pos: Position,
    pub msg: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_pos(f, &self.file, self.pos)?;
        write!(f, ": {}", self.msg)
    }
}

/// Comments attached to a statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comments {
    /// Whole-line comments directly above the statement.
    pub before: Vec<String>,
    /// End-of-line comments, `//` included.
    pub suffix: Vec<String>,
}

/// A single statement line, either top-level or inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    tokens: Vec<String>,
    comments: Comments,
    start: Position,
    end: Position,
    in_block: bool,
    leading: String,
    raw: Option<String>,
}

impl Line {
    fn new(tokens: Vec<String>, in_block: bool) -> Self {
        Line {
            tokens,
            comments: Comments::default(),
            start: Position::default(),
            end: Position::default(),
            in_block,
            leading: String::new(),
            raw: None,
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn comments(&self) -> &Comments {
        &self.comments
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Replace the tokens of this line. The line is re-rendered on format.
    pub fn set_tokens(&mut self, tokens: Vec<String>) {
        if self.tokens != tokens {
            self.tokens = tokens;
            self.raw = None;
        }
    }

    pub fn set_token(&mut self, idx: usize, token: impl Into<String>) {
        let token = token.into();
        if self.tokens.get(idx) != Some(&token) {
            if idx < self.tokens.len() {
                self.tokens[idx] = token;
            } else {
                self.tokens.push(token);
            }
            self.raw = None;
        }
    }

    pub fn add_suffix_comment(&mut self, comment: impl Into<String>) {
        self.comments.suffix.push(comment.into());
        self.raw = None;
    }

    pub fn is_modified(&self) -> bool {
        self.raw.is_none()
    }

    fn render(&self, out: &mut String) {
        out.push_str(&self.leading);
        match &self.raw {
            Some(raw) => out.push_str(raw),
            None => {
                if self.in_block {
                    out.push('\t');
                }
                out.push_str(&self.tokens.join(" "));
                for c in &self.comments.suffix {
                    out.push(' ');
                    out.push_str(c);
                }
                out.push('\n');
            }
        }
    }
}

/// A parenthesized block: `verb (` lines `)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBlock {
    tokens: Vec<String>,
    comments: Comments,
    lines: Vec<Line>,
    start: Position,
    end: Position,
    leading: String,
    header_raw: Option<String>,
    footer_raw: Option<String>,
}

impl LineBlock {
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line_mut(&mut self, idx: usize) -> Option<&mut Line> {
        self.lines.get_mut(idx)
    }

    pub fn start(&self) -> Position {
        self.start
    }

    /// Append a line to the block and return it.
    pub fn push_line(&mut self, tokens: Vec<String>) -> &mut Line {
        let idx = self.lines.len();
        self.lines.push(Line::new(tokens, true));
        &mut self.lines[idx]
    }

    fn render(&self, out: &mut String) {
        out.push_str(&self.leading);
        match &self.header_raw {
            Some(raw) => out.push_str(raw),
            None => {
                out.push_str(&self.tokens.join(" "));
                out.push_str(" (");
                for c in &self.comments.suffix {
                    out.push(' ');
                    out.push_str(c);
                }
                out.push('\n');
            }
        }
        for line in &self.lines {
            line.render(out);
        }
        match &self.footer_raw {
            Some(raw) => out.push_str(raw),
            None => out.push_str(")\n"),
        }
    }
}

/// A top-level statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Line(Line),
    Block(LineBlock),
}

impl Stmt {
    /// The statement verb (first token).
    pub fn verb(&self) -> &str {
        let tokens = match self {
            Stmt::Line(l) => &l.tokens,
            Stmt::Block(b) => &b.tokens,
        };
        tokens.first().map(String::as_str).unwrap_or("")
    }

    pub fn start(&self) -> Position {
        match self {
            Stmt::Line(l) => l.start,
            Stmt::Block(b) => b.start,
        }
    }

    fn leading(&self) -> &str {
        match self {
            Stmt::Line(l) => &l.leading,
            Stmt::Block(b) => &b.leading,
        }
    }

    fn set_leading(&mut self, leading: String) {
        match self {
            Stmt::Line(l) => l.leading = leading,
            Stmt::Block(b) => b.leading = leading,
        }
    }
}

/// Identifies one logical line in a [`FileSyntax`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRef {
    pub stmt: usize,
    pub line: Option<usize>,
}

/// One logical entry: a top-level line, or a line inside a block.
///
/// For a top-level line `args` excludes the verb; for a block line `args`
/// is the whole line and `verb` comes from the block header.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    pub verb: &'a str,
    pub args: &'a [String],
    pub line: &'a Line,
    pub at: LineRef,
}

/// A parsed manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSyntax {
    name: String,
    stmts: Vec<Stmt>,
    trailer: String,
}

fn stmt_entries(i: usize, stmt: &Stmt) -> Vec<Entry<'_>> {
    match stmt {
        Stmt::Line(l) => vec![Entry {
            verb: stmt.verb(),
            args: l.tokens.get(1..).unwrap_or_default(),
            line: l,
            at: LineRef {
                stmt: i,
                line: None,
            },
        }],
        Stmt::Block(b) => b
            .lines
            .iter()
            .enumerate()
            .map(|(j, l)| Entry {
                verb: stmt.verb(),
                args: &l.tokens,
                line: l,
                at: LineRef {
                    stmt: i,
                    line: Some(j),
                },
            })
            .collect(),
    }
}

/// Parse `text` as a line-oriented manifest named `name`.
pub fn parse(name: &str, text: &str) -> Result<FileSyntax, SyntaxError> {
    read::Reader::new(name, text).read_file()
}

impl FileSyntax {
    /// An empty file.
    pub fn new(name: impl Into<String>) -> Self {
        FileSyntax {
            name: name.into(),
            stmts: Vec::new(),
            trailer: String::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stmts(&self) -> &[Stmt] {
        &self.stmts
    }

    /// Iterate every logical entry in file order.
    pub fn entries(&self) -> impl Iterator<Item = Entry<'_>> {
        self.stmts
            .iter()
            .enumerate()
            .flat_map(|(i, stmt)| stmt_entries(i, stmt))
    }

    pub fn line_mut(&mut self, at: LineRef) -> Option<&mut Line> {
        match (self.stmts.get_mut(at.stmt)?, at.line) {
            (Stmt::Line(l), None) => Some(l),
            (Stmt::Block(b), Some(j)) => b.lines.get_mut(j),
            _ => None,
        }
    }

    pub fn block_mut(&mut self, stmt: usize) -> Option<&mut LineBlock> {
        match self.stmts.get_mut(stmt)? {
            Stmt::Block(b) => Some(b),
            Stmt::Line(_) => None,
        }
    }

    /// Insert a new top-level line, ordered by `weigh`.
    ///
    /// The line goes before the first statement weighing more than it, so
    /// statements of equal weight keep their insertion order. Existing
    /// statements are never reordered.
    pub fn insert_line(&mut self, tokens: Vec<String>, weigh: impl Fn(&str) -> u32) -> LineRef {
        let verb = tokens.first().cloned().unwrap_or_default();
        let idx = self.insert_pos(&verb, &weigh);
        self.insert_stmt(idx, Stmt::Line(Line::new(tokens, false)));
        LineRef {
            stmt: idx,
            line: None,
        }
    }

    /// Turn the top-level line at `idx` into a block holding that line.
    pub fn line_to_block(&mut self, idx: usize) -> Option<&mut LineBlock> {
        let Some(Stmt::Line(line)) = self.stmts.get(idx) else {
            return None;
        };
        let mut tokens = line.tokens.clone();
        let verb = tokens.remove(0);
        let mut inner = Line::new(tokens, true);
        inner.comments.suffix = line.comments.suffix.clone();
        inner.start = line.start;
        let block = LineBlock {
            tokens: vec![verb],
            comments: Comments {
                before: line.comments.before.clone(),
                suffix: Vec::new(),
            },
            lines: vec![inner],
            start: line.start,
            end: line.end,
            leading: line.leading.clone(),
            header_raw: None,
            footer_raw: None,
        };
        self.stmts[idx] = Stmt::Block(block);
        self.block_mut(idx)
    }

    fn insert_pos(&self, verb: &str, weigh: &impl Fn(&str) -> u32) -> usize {
        let w = weigh(verb);
        self.stmts
            .iter()
            .position(|s| weigh(s.verb()) > w)
            .unwrap_or(self.stmts.len())
    }

    fn insert_stmt(&mut self, idx: usize, mut stmt: Stmt) {
        let verb = stmt.verb().to_string();
        if let Some(prev) = idx.checked_sub(1).and_then(|i| self.stmts.get(i)) {
            if prev.verb() != verb
                || matches!(prev, Stmt::Block(_))
                || matches!(stmt, Stmt::Block(_))
            {
                stmt.set_leading("\n".to_string());
            }
        }
        if let Some(next) = self.stmts.get_mut(idx) {
            if next.verb() != verb && next.leading().is_empty() {
                next.set_leading("\n".to_string());
            }
        }
        self.stmts.insert(idx, stmt);
    }

    /// Render the file. Unmodified statements reproduce their source bytes.
    pub fn format(&self) -> String {
        let mut out = String::new();
        for stmt in &self.stmts {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            match stmt {
                Stmt::Line(l) => l.render(&mut out),
                Stmt::Block(b) => b.render(&mut out),
            }
        }
        if !self.trailer.is_empty() && !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&self.trailer);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weigh(verb: &str) -> u32 {
        match verb {
            "module" => 1,
            "go" => 2,
            "require" => 4,
            _ => 0x80,
        }
    }

    #[test]
    fn test_round_trip_preserves_bytes() {
        let inputs = [
            "",
            "module foo\n",
            "module foo",
            "// header\n\nmodule foo // the module\n\n\ngo 1.21\r\n",
            "require (\n\ta v1.0.0 // indirect\n\n\t// b is pinned\n\tb v1.2.0\n) // done\n// trailing\n",
            "replace  x   =>   ../y\n\n// only a comment",
            "project \"with space\" `raw`\n",
        ];
        for input in inputs {
            let file = parse("go.mod", input).unwrap();
            assert_eq!(file.format(), input, "input: {:?}", input);
        }
    }

    #[test]
    fn test_entries_flatten_blocks() {
        let file = parse(
            "go.mod",
            "module foo\nrequire (\n\ta v1.0.0\n\tb v1.1.0 // indirect\n)\n",
        )
        .unwrap();
        let entries: Vec<_> = file.entries().collect();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].verb, "module");
        assert_eq!(entries[0].args, ["foo"]);
        assert_eq!(entries[2].verb, "require");
        assert_eq!(entries[2].args, ["b", "v1.1.0"]);
        assert_eq!(entries[2].line.comments().suffix, ["// indirect"]);
        assert_eq!(entries[2].line.start().line, 4);
        assert_eq!(entries[2].line.start().col, 2);
    }

    #[test]
    fn test_before_comments() {
        let file = parse("x", "// one\n// two\nmodule foo\n\n// lost\n\ngo 1.21\n").unwrap();
        let entries: Vec<_> = file.entries().collect();
        assert_eq!(entries[0].line.comments().before, ["// one", "// two"]);
        assert!(entries[1].line.comments().before.is_empty());
    }

    #[test]
    fn test_syntax_errors() {
        let err = parse("gox.mod", "xgo 1.5\nimport \"abc\n").unwrap_err();
        assert_eq!(err.to_string(), "gox.mod:2:12: unexpected newline in string");

        let err = parse("gox.mod", "require (\n\ta v1\n").unwrap_err();
        assert!(err.msg.contains("unterminated block started at gox.mod:1:1"));

        let err = parse("gox.mod", ")\n").unwrap_err();
        assert_eq!(err.to_string(), "gox.mod:1: syntax error: unexpected )");

        let err = parse("gox.mod", "a /* b */\n").unwrap_err();
        assert!(err.msg.contains("// comments"));
    }

    #[test]
    fn test_insert_line_weight_order() {
        let mut file = parse("go.mod", "module foo\n\nrequire a v1.0.0\n").unwrap();
        file.insert_line(vec!["go".into(), "1.21".into()], weigh);
        assert_eq!(file.format(), "module foo\n\ngo 1.21\n\nrequire a v1.0.0\n");
    }

    #[test]
    fn test_insert_into_empty_file() {
        let mut file = FileSyntax::new("gox.mod");
        file.insert_line(vec!["xgo".into(), "1.5".into()], weigh);
        assert_eq!(file.format(), "xgo 1.5\n");
    }

    #[test]
    fn test_insert_same_verb_groups_lines() {
        let mut file = parse("x", "module foo\nrequire a v1.0.0\n").unwrap();
        file.insert_line(vec!["require".into(), "b".into(), "v1.0.0".into()], weigh);
        assert_eq!(file.format(), "module foo\nrequire a v1.0.0\nrequire b v1.0.0\n");
    }

    #[test]
    fn test_insert_after_unterminated_last_line() {
        let mut file = parse("x", "module foo").unwrap();
        file.insert_line(vec!["go".into(), "1.21".into()], weigh);
        assert_eq!(file.format(), "module foo\n\ngo 1.21\n");
    }

    #[test]
    fn test_line_to_block() {
        let mut file = parse("x", "module foo\n\nrequire a v1.0.0 // indirect\n").unwrap();
        let block = file.line_to_block(1).unwrap();
        block.push_line(vec!["b".into(), "v1.1.0".into()]);
        assert_eq!(
            file.format(),
            "module foo\n\nrequire (\n\ta v1.0.0 // indirect\n\tb v1.1.0\n)\n"
        );
    }

    #[test]
    fn test_edit_line_in_block() {
        let mut file = parse("x", "require (\n    a   v1.0.0\n\tb v1.0.0\n)\n").unwrap();
        let at = file.entries().nth(1).unwrap().at;
        file.line_mut(at).unwrap().set_token(1, "v2.0.0");
        assert_eq!(file.format(), "require (\n    a   v1.0.0\n\tb v2.0.0\n)\n");
    }
}
