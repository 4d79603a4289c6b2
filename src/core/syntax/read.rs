//! Lexer and statement reader for line-oriented manifests.

use super::{Comments, FileSyntax, Line, LineBlock, Position, Stmt, SyntaxError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Ident,
    Quoted,
    Punct,
    Arrow,
    LParen,
    RParen,
    Comment,
    Newline,
    Eof,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    text: String,
    pos: Position,
}

impl Token {
    fn is_word(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Ident | TokenKind::Quoted | TokenKind::Punct | TokenKind::Arrow
        )
    }

    fn ends_line(&self) -> bool {
        matches!(self.kind, TokenKind::Newline | TokenKind::Eof)
    }
}

fn is_ident(c: char) -> bool {
    !matches!(c, '(' | ')' | '[' | ']' | '{' | '}' | ',')
        && !c.is_whitespace()
        && !c.is_control()
}

/// Reads a manifest into a [`FileSyntax`].
pub(super) struct Reader<'a> {
    name: &'a str,
    src: &'a str,
    pos: Position,
}

impl<'a> Reader<'a> {
    pub(super) fn new(name: &'a str, src: &'a str) -> Self {
        Reader {
            name,
            src,
            pos: Position {
                line: 1,
                col: 1,
                byte: 0,
            },
        }
    }

    fn error(&self, pos: Position, msg: impl Into<String>) -> SyntaxError {
        SyntaxError {
            file: self.name.to_string(),
            pos,
            msg: msg.into(),
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.src[self.pos.byte..].chars().next()
    }

    fn peek_prefix(&self, prefix: &str) -> bool {
        self.src[self.pos.byte..].starts_with(prefix)
    }

    fn read_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos.byte += c.len_utf8();
        if c == '\n' {
            self.pos.line += 1;
            self.pos.col = 1;
        } else {
            self.pos.col += 1;
        }
        Some(c)
    }

    fn token(&self, kind: TokenKind, start: Position) -> Token {
        Token {
            kind,
            text: self.src[start.byte..self.pos.byte].to_string(),
            pos: start,
        }
    }

    fn lex(&mut self) -> Result<Token, SyntaxError> {
        while let Some(c) = self.peek_char() {
            if c == ' ' || c == '\t' || c == '\r' {
                self.read_char();
            } else {
                break;
            }
        }

        let start = self.pos;
        let c = match self.peek_char() {
            Some(c) => c,
            None => return Ok(self.token(TokenKind::Eof, start)),
        };

        if c == '\n' {
            self.read_char();
            return Ok(self.token(TokenKind::Newline, start));
        }
        if self.peek_prefix("//") {
            while let Some(c) = self.peek_char() {
                if c == '\n' {
                    break;
                }
                self.read_char();
            }
            let mut tok = self.token(TokenKind::Comment, start);
            tok.text = tok.text.trim_end().to_string();
            return Ok(tok);
        }
        if self.peek_prefix("/*") {
            return Err(self.error(start, "mod files must use // comments, not /* */ comments"));
        }
        if self.peek_prefix("=>") {
            self.read_char();
            self.read_char();
            return Ok(self.token(TokenKind::Arrow, start));
        }

        match c {
            '(' => {
                self.read_char();
                Ok(self.token(TokenKind::LParen, start))
            }
            ')' => {
                self.read_char();
                Ok(self.token(TokenKind::RParen, start))
            }
            '[' | ']' | '{' | '}' | ',' => {
                self.read_char();
                Ok(self.token(TokenKind::Punct, start))
            }
            '"' | '`' => self.lex_string(c, start),
            c if is_ident(c) => {
                while let Some(c) = self.peek_char() {
                    if !is_ident(c) || self.peek_prefix("//") {
                        break;
                    }
                    if self.peek_prefix("/*") {
                        return Err(self.error(
                            self.pos,
                            "mod files must use // comments, not /* */ comments",
                        ));
                    }
                    self.read_char();
                }
                Ok(self.token(TokenKind::Ident, start))
            }
            c => Err(self.error(start, format!("unexpected input character {:?}", c))),
        }
    }

    fn lex_string(&mut self, quote: char, start: Position) -> Result<Token, SyntaxError> {
        self.read_char();
        loop {
            match self.peek_char() {
                None => return Err(self.error(self.pos, "unexpected EOF in string")),
                Some('\n') => return Err(self.error(self.pos, "unexpected newline in string")),
                Some('\\') if quote == '"' => {
                    self.read_char();
                    match self.peek_char() {
                        None => return Err(self.error(self.pos, "unexpected EOF in string")),
                        Some('\n') => {
                            return Err(self.error(self.pos, "unexpected newline in string"))
                        }
                        Some(_) => {
                            self.read_char();
                        }
                    }
                }
                Some(c) => {
                    self.read_char();
                    if c == quote {
                        return Ok(self.token(TokenKind::Quoted, start));
                    }
                }
            }
        }
    }

    /// Consume the rest of a line after its last word: an optional comment
    /// and the terminating newline.
    fn finish_line(&mut self, suffix: &mut Vec<String>) -> Result<(), SyntaxError> {
        let tok = self.lex()?;
        match tok.kind {
            TokenKind::Newline | TokenKind::Eof => Ok(()),
            TokenKind::Comment => {
                suffix.push(tok.text);
                let tok = self.lex()?;
                debug_assert!(tok.ends_line());
                Ok(())
            }
            _ => Err(self.error(tok.pos, format!("syntax error: unexpected {}", tok.text))),
        }
    }

    pub(super) fn read_file(mut self) -> Result<FileSyntax, SyntaxError> {
        let mut stmts = Vec::new();
        let mut prev_end = 0;
        let mut before = Vec::new();

        loop {
            let line_start = self.pos.byte;
            let tok = self.lex()?;
            match tok.kind {
                TokenKind::Newline => before.clear(),
                TokenKind::Comment => {
                    before.push(tok.text);
                    let next = self.lex()?;
                    if next.kind == TokenKind::Eof {
                        break;
                    }
                }
                TokenKind::Eof => break,
                TokenKind::RParen | TokenKind::LParen => {
                    return Err(
                        self.error(tok.pos, format!("syntax error: unexpected {}", tok.text))
                    );
                }
                _ => {
                    let leading = self.src[prev_end..line_start].to_string();
                    let comments = Comments {
                        before: std::mem::take(&mut before),
                        suffix: Vec::new(),
                    };
                    let stmt = self.read_stmt(tok, line_start, leading, comments)?;
                    stmts.push(stmt);
                    prev_end = self.pos.byte;
                }
            }
        }

        Ok(FileSyntax {
            name: self.name.to_string(),
            stmts,
            trailer: self.src[prev_end..].to_string(),
        })
    }

    fn read_stmt(
        &mut self,
        first: Token,
        line_start: usize,
        leading: String,
        mut comments: Comments,
    ) -> Result<Stmt, SyntaxError> {
        let start = first.pos;
        let mut tokens = vec![first.text];

        loop {
            let tok = self.lex()?;
            match tok.kind {
                _ if tok.is_word() => tokens.push(tok.text),
                TokenKind::Comment => {
                    comments.suffix.push(tok.text);
                    self.lex()?;
                    break;
                }
                TokenKind::LParen => {
                    return self.read_block(tokens, start, line_start, leading, comments);
                }
                TokenKind::RParen => {
                    return Err(self.error(tok.pos, "syntax error: unexpected )"));
                }
                _ => break,
            }
        }

        Ok(Stmt::Line(Line {
            tokens,
            comments,
            start,
            end: self.pos,
            in_block: false,
            leading,
            raw: Some(self.src[line_start..self.pos.byte].to_string()),
        }))
    }

    fn read_block(
        &mut self,
        tokens: Vec<String>,
        start: Position,
        line_start: usize,
        leading: String,
        mut comments: Comments,
    ) -> Result<Stmt, SyntaxError> {
        let unterminated = |r: &Self| {
            r.error(
                start,
                format!(
                    "syntax error (unterminated block started at {}:{}:{})",
                    r.name, start.line, start.col
                ),
            )
        };

        let tok = self.lex()?;
        match tok.kind {
            TokenKind::Newline => {}
            TokenKind::Comment => {
                comments.suffix.push(tok.text);
                if self.lex()?.kind == TokenKind::Eof {
                    return Err(unterminated(self));
                }
            }
            TokenKind::Eof => return Err(unterminated(self)),
            _ => {
                return Err(self.error(tok.pos, "syntax error: expected newline after ("));
            }
        }

        let header_end = self.pos.byte;
        let mut lines = Vec::new();
        let mut prev = header_end;
        let mut before = Vec::new();

        loop {
            let ls = self.pos.byte;
            let tok = self.lex()?;
            match tok.kind {
                TokenKind::Newline => before.clear(),
                TokenKind::Comment => {
                    before.push(tok.text);
                    if self.lex()?.kind == TokenKind::Eof {
                        return Err(unterminated(self));
                    }
                }
                TokenKind::Eof => return Err(unterminated(self)),
                TokenKind::RParen => {
                    let mut trailing = Vec::new();
                    self.finish_line(&mut trailing)?;
                    let footer_raw = self.src[prev..self.pos.byte].to_string();
                    return Ok(Stmt::Block(LineBlock {
                        tokens,
                        comments,
                        lines,
                        start,
                        end: self.pos,
                        leading,
                        header_raw: Some(self.src[line_start..header_end].to_string()),
                        footer_raw: Some(footer_raw),
                    }));
                }
                TokenKind::LParen => {
                    return Err(self.error(tok.pos, "syntax error: unexpected ("));
                }
                _ => {
                    let line_pos = tok.pos;
                    let mut line_tokens = vec![tok.text];
                    let mut line_comments = Comments {
                        before: std::mem::take(&mut before),
                        suffix: Vec::new(),
                    };
                    loop {
                        let tok = self.lex()?;
                        match tok.kind {
                            _ if tok.is_word() => line_tokens.push(tok.text),
                            TokenKind::Comment => {
                                line_comments.suffix.push(tok.text);
                                self.lex()?;
                                break;
                            }
                            TokenKind::Newline | TokenKind::Eof => break,
                            _ => {
                                return Err(self.error(
                                    tok.pos,
                                    format!("syntax error: unexpected {}", tok.text),
                                ));
                            }
                        }
                    }
                    lines.push(Line {
                        tokens: line_tokens,
                        comments: line_comments,
                        start: line_pos,
                        end: self.pos,
                        in_block: true,
                        leading: self.src[prev..ls].to_string(),
                        raw: Some(self.src[ls..self.pos.byte].to_string()),
                    });
                    prev = self.pos.byte;
                }
            }
        }
    }
}
