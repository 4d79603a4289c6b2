//! Quoting rules for manifest tokens.
//!
//! Tokens that start with `"` follow the usual double-quoted escape rules;
//! everything else is taken literally. When a value is written back it is
//! only quoted if it could not survive the lexer as a bare token.

use thiserror::Error;

/// Error produced when a quoted token is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid syntax")]
pub struct QuoteError;

/// Unquote a double-quoted or back-quoted token.
pub fn unquote(s: &str) -> Result<String, QuoteError> {
    let mut chars = s.chars();
    let (first, last) = match (chars.next(), chars.next_back()) {
        (Some(f), Some(l)) => (f, l),
        _ => return Err(QuoteError),
    };
    if first != last {
        return Err(QuoteError);
    }
    let body = &s[1..s.len() - 1];
    match first {
        '`' => {
            if body.contains('`') {
                return Err(QuoteError);
            }
            Ok(body.replace('\r', ""))
        }
        '"' => unescape(body),
        _ => Err(QuoteError),
    }
}

fn unescape(body: &str) -> Result<String, QuoteError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' | '\n' => return Err(QuoteError),
            '\\' => {
                let esc = chars.next().ok_or(QuoteError)?;
                match esc {
                    'a' => out.push('\x07'),
                    'b' => out.push('\x08'),
                    'f' => out.push('\x0c'),
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    'v' => out.push('\x0b'),
                    '\\' => out.push('\\'),
                    '\'' => out.push('\''),
                    '"' => out.push('"'),
                    'x' => out.push(read_hex(&mut chars, 2)?),
                    'u' => out.push(read_hex(&mut chars, 4)?),
                    'U' => out.push(read_hex(&mut chars, 8)?),
                    '0'..='7' => {
                        let mut value = esc.to_digit(8).ok_or(QuoteError)?;
                        for _ in 0..2 {
                            let d = chars
                                .next()
                                .and_then(|d| d.to_digit(8))
                                .ok_or(QuoteError)?;
                            value = value * 8 + d;
                        }
                        if value > 0xff {
                            return Err(QuoteError);
                        }
                        out.push(char::from_u32(value).ok_or(QuoteError)?);
                    }
                    _ => return Err(QuoteError),
                }
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

fn read_hex(chars: &mut impl Iterator<Item = char>, n: usize) -> Result<char, QuoteError> {
    let mut value = 0u32;
    for _ in 0..n {
        let d = chars
            .next()
            .and_then(|d| d.to_digit(16))
            .ok_or(QuoteError)?;
        value = value * 16 + d;
    }
    char::from_u32(value).ok_or(QuoteError)
}

/// Quote a string using double-quote escape rules.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\x07' => out.push_str("\\a"),
            '\x08' => out.push_str("\\b"),
            '\x0c' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x0b' => out.push_str("\\v"),
            c if (c as u32) < 0x80 && c.is_control() => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c if c.is_control() => {
                if (c as u32) <= 0xffff {
                    out.push_str(&format!("\\u{:04x}", c as u32));
                } else {
                    out.push_str(&format!("\\U{:08x}", c as u32));
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Report whether `s` must be quoted to appear as a single token.
pub fn must_quote(s: &str) -> bool {
    for c in s.chars() {
        match c {
            ' ' | '"' | '\'' | '`' => return true,
            '(' | ')' | '[' | ']' | '{' | '}' | ',' => {
                if s.len() > 1 {
                    return true;
                }
            }
            c if c.is_control() || c.is_whitespace() => return true,
            _ => {}
        }
    }
    s.is_empty() || s.contains("//") || s.contains("/*")
}

/// Return `s`, quoted only if required.
pub fn auto_quote(s: &str) -> String {
    if must_quote(s) {
        quote(s)
    } else {
        s.to_string()
    }
}
