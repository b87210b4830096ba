//! Restricted literal grammar for the structured save-file fields.
//!
//! Holdings are stored as a mapping literal and lookups as a sequence literal,
//! in the quoting dialect older save files already use:
//!
//! ```text
//! mapping  := '{' [ entry { ',' entry } [ ',' ] ] '}'
//! entry    := string ':' integer
//! sequence := '[' [ string { ',' string } [ ',' ] ] ']'
//! string   := "'" ... "'" | '"' ... '"'     (backslash escapes)
//! integer  := digit { digit }
//! ```
//!
//! Whitespace is allowed between tokens. Nothing else is accepted: no bare
//! words, calls, nesting, signs or floats.

use thiserror::Error;

/// Why a literal failed to parse.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LiteralErrorKind {
    #[error("expected '{0}'")]
    Expected(char),
    #[error("expected a quoted string")]
    ExpectedString,
    #[error("expected an unsigned integer")]
    ExpectedInteger,
    #[error("integer does not fit in 64 bits")]
    IntegerOverflow,
    #[error("unterminated string")]
    UnterminatedString,
    #[error("invalid escape sequence")]
    InvalidEscape,
    #[error("unexpected input after literal")]
    TrailingInput,
}

/// Parse failure with the byte offset where it was detected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{kind} at byte {offset}")]
pub struct LiteralError {
    pub offset: usize,
    pub kind: LiteralErrorKind,
}

/// Parse a `{'KEY': count, ...}` literal. Entries keep their written order;
/// duplicate keys are reported to the caller as-is.
pub fn parse_mapping(input: &str) -> Result<Vec<(String, u64)>, LiteralError> {
    let mut parser = Parser::new(input);
    let entries = parser.delimited('{', '}', |parser| {
        let key = parser.string()?;
        parser.expect(':')?;
        let value = parser.integer()?;
        Ok((key, value))
    })?;
    parser.finish()?;
    Ok(entries)
}

/// Parse a `['text', ...]` literal.
pub fn parse_sequence(input: &str) -> Result<Vec<String>, LiteralError> {
    let mut parser = Parser::new(input);
    let items = parser.delimited('[', ']', Parser::string)?;
    parser.finish()?;
    Ok(items)
}

pub fn write_mapping<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a str, u64)>,
{
    let body = entries
        .into_iter()
        .map(|(key, value)| format!("{}: {value}", quote(key)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{body}}}")
}

pub fn write_sequence<'a, I>(items: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let body = items.into_iter().map(quote).collect::<Vec<_>>().join(", ");
    format!("[{body}]")
}

/// Quote a string literal. Single quotes unless the text holds a `'` and no `"`.
pub fn quote(text: &str) -> String {
    let delimiter = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(text.len() + 2);
    out.push(delimiter);
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch == delimiter => {
                out.push('\\');
                out.push(ch);
            }
            ch if ch.is_ascii_control() => out.push_str(&format!("\\x{:02x}", ch as u32)),
            ch => out.push(ch),
        }
    }
    out.push(delimiter);
    out
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn error(&self, kind: LiteralErrorKind) -> LiteralError {
        LiteralError {
            offset: self.pos,
            kind,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\n' | '\r')) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, want: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(want) {
            self.pos += want.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, want: char) -> Result<(), LiteralError> {
        if self.eat(want) {
            Ok(())
        } else {
            Err(self.error(LiteralErrorKind::Expected(want)))
        }
    }

    fn finish(&mut self) -> Result<(), LiteralError> {
        self.skip_whitespace();
        if self.pos == self.input.len() {
            Ok(())
        } else {
            Err(self.error(LiteralErrorKind::TrailingInput))
        }
    }

    fn delimited<T>(
        &mut self,
        open: char,
        close: char,
        mut item: impl FnMut(&mut Self) -> Result<T, LiteralError>,
    ) -> Result<Vec<T>, LiteralError> {
        self.expect(open)?;
        let mut items = Vec::new();
        loop {
            if self.eat(close) {
                return Ok(items);
            }
            items.push(item(self)?);
            if !self.eat(',') {
                self.expect(close)?;
                return Ok(items);
            }
        }
    }

    fn string(&mut self) -> Result<String, LiteralError> {
        self.skip_whitespace();
        let delimiter = match self.peek() {
            Some(ch @ ('\'' | '"')) => ch,
            _ => return Err(self.error(LiteralErrorKind::ExpectedString)),
        };
        let start = self.pos;
        self.pos += 1;

        let mut out = String::new();
        loop {
            match self.bump() {
                Some(ch) if ch == delimiter => return Ok(out),
                Some('\\') => out.push(self.escape()?),
                Some('\n' | '\r') | None => {
                    return Err(LiteralError {
                        offset: start,
                        kind: LiteralErrorKind::UnterminatedString,
                    })
                }
                Some(ch) => out.push(ch),
            }
        }
    }

    fn escape(&mut self) -> Result<char, LiteralError> {
        let at = self.pos.saturating_sub(1);
        let invalid = LiteralError {
            offset: at,
            kind: LiteralErrorKind::InvalidEscape,
        };
        let decoded = match self.bump() {
            Some(ch @ ('\\' | '\'' | '"')) => ch,
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('0') => '\0',
            Some('x') => self.hex_char(2).ok_or(invalid)?,
            Some('u') => self.hex_char(4).ok_or(invalid)?,
            Some('U') => self.hex_char(8).ok_or(invalid)?,
            _ => return Err(invalid),
        };
        Ok(decoded)
    }

    fn hex_char(&mut self, digits: usize) -> Option<char> {
        let end = self.pos.checked_add(digits)?;
        let hex = self.input.get(self.pos..end)?;
        if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return None;
        }
        let code = u32::from_str_radix(hex, 16).ok()?;
        self.pos = end;
        char::from_u32(code)
    }

    fn integer(&mut self) -> Result<u64, LiteralError> {
        self.skip_whitespace();
        let start = self.pos;
        while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error(LiteralErrorKind::ExpectedInteger));
        }
        self.input[start..self.pos].parse().map_err(|_| LiteralError {
            offset: start,
            kind: LiteralErrorKind::IntegerOverflow,
        })
    }
}
