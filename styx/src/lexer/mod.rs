//! Lexer for Styx source text.
//!
//! A pull-based scanner: [`Lexer::next_token`] yields one token at a time with
//! byte spans and the whitespace/newline flags computed during the preceding
//! skip phase. Escapes and heredoc dedent are applied here, so token `text` is
//! already the literal content.
//!
//! The lexer never returns a malformed token; every failure is a
//! [`ParseError`] with a byte span into the original source.

mod token;

pub use token::{Token, TokenKind};

use tracing::trace;

use crate::error::ParseError;
use crate::span::Span;

/// Characters that terminate a bare scalar.
///
/// `@`, `<`, `/`, and `#` are deliberately absent: they only have meaning at
/// token start and may appear inside bare scalars.
fn is_special(ch: char) -> bool {
    matches!(
        ch,
        '{' | '}' | '(' | ')' | ',' | '"' | '>' | ' ' | '\t' | '\n' | '\r'
    )
}

fn is_tag_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_tag_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

/// Tokenizer for Styx source code.
///
/// State is the source and a byte cursor; spans are byte-indexed and the
/// source is assumed to be valid UTF-8 (guaranteed by `&str`).
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer { source, pos: 0 }
    }

    /// Return the next token, or the error that made further progress
    /// impossible.
    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        let token = self.scan_token()?;
        trace!(kind = %token.kind, start = token.span.start, end = token.span.end, "token");
        Ok(token)
    }

    fn scan_token(&mut self) -> Result<Token, ParseError> {
        let (had_whitespace, had_newline) = self.skip_whitespace_and_comments();

        let start = self.pos;
        let Some(ch) = self.peek() else {
            return Ok(self.token(TokenKind::Eof, String::new(), start, had_whitespace, had_newline));
        };

        match ch {
            '{' | '}' | '(' | ')' | ',' | '>' => {
                self.bump();
                let kind = match ch {
                    '{' => TokenKind::LBrace,
                    '}' => TokenKind::RBrace,
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    ',' => TokenKind::Comma,
                    _ => TokenKind::Gt,
                };
                Ok(self.token(kind, ch.to_string(), start, had_whitespace, had_newline))
            }
            '@' => {
                self.bump();
                if self.peek().is_some_and(is_tag_start) {
                    let name_start = self.pos;
                    while self.peek().is_some_and(is_tag_char) {
                        self.bump();
                    }
                    let name = self.source[name_start..self.pos].to_string();
                    Ok(self.token(TokenKind::Tag, name, start, had_whitespace, had_newline))
                } else {
                    Ok(self.token(TokenKind::At, "@".to_string(), start, had_whitespace, had_newline))
                }
            }
            '"' => self.quoted_string(start, had_whitespace, had_newline),
            'r' if matches!(self.peek_at(1), Some('"' | '#')) => {
                self.raw_string(start, had_whitespace, had_newline)
            }
            '<' if self.peek_at(1) == Some('<') => {
                if self.peek_at(2).is_some_and(|c| c.is_ascii_uppercase()) {
                    self.heredoc(start, had_whitespace, had_newline)
                } else {
                    self.bump();
                    self.bump();
                    let error_end = self.pos;
                    // Skip the rest of the line so a caller that keeps pulling
                    // tokens resynchronizes; the span stays on the two `<`s.
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                    Err(ParseError::new("unexpected token", Span::new(start, error_end)))
                }
            }
            _ => Ok(self.bare_scalar(start, had_whitespace, had_newline)),
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn token(
        &self,
        kind: TokenKind,
        text: String,
        start: usize,
        had_whitespace_before: bool,
        had_newline_before: bool,
    ) -> Token {
        Token {
            kind,
            text,
            span: Span::new(start, self.pos),
            had_whitespace_before,
            had_newline_before,
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> (bool, bool) {
        let mut had_whitespace = false;
        let mut had_newline = false;

        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r') => {
                    had_whitespace = true;
                    self.bump();
                }
                Some('\n') => {
                    had_whitespace = true;
                    had_newline = true;
                    self.bump();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    had_whitespace = true;
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                _ => break,
            }
        }

        (had_whitespace, had_newline)
    }

    fn quoted_string(
        &mut self,
        start: usize,
        had_whitespace: bool,
        had_newline: bool,
    ) -> Result<Token, ParseError> {
        self.bump(); // opening quote
        let mut text = String::new();

        while let Some(ch) = self.peek() {
            match ch {
                '"' => {
                    self.bump();
                    return Ok(self.token(TokenKind::Quoted, text, start, had_whitespace, had_newline));
                }
                '\\' => {
                    let escape_start = self.pos;
                    self.bump();
                    match self.bump() {
                        Some('n') => text.push('\n'),
                        Some('r') => text.push('\r'),
                        Some('t') => text.push('\t'),
                        Some('\\') => text.push('\\'),
                        Some('"') => text.push('"'),
                        Some('u') => {
                            if let Some(decoded) = self.unicode_escape(escape_start)? {
                                text.push(decoded);
                            }
                        }
                        other => {
                            let escaped = other.map(String::from).unwrap_or_default();
                            return Err(ParseError::new(
                                format!("invalid escape sequence: \\{escaped}"),
                                Span::new(escape_start, self.pos),
                            ));
                        }
                    }
                }
                '\n' | '\r' => {
                    // Unterminated literal; the newline belongs to the span.
                    self.bump();
                    if ch == '\r' && self.peek() == Some('\n') {
                        self.bump();
                    }
                    return Err(ParseError::new("unexpected token", Span::new(start, self.pos)));
                }
                _ => {
                    self.bump();
                    text.push(ch);
                }
            }
        }

        Err(ParseError::new("unexpected token", Span::new(start, self.pos)))
    }

    /// Decode `\u{HEX…}` (braced, variable length) or `\uHHHH` (exactly four
    /// hex digits) after the `\u` has been consumed.
    ///
    /// A braced escape cut off by end of input decodes to nothing; the caller's
    /// loop then reports the unterminated string.
    fn unicode_escape(&mut self, escape_start: usize) -> Result<Option<char>, ParseError> {
        let invalid = || {
            ParseError::new(
                "invalid escape sequence: \\u",
                Span::new(escape_start, escape_start + 2),
            )
        };

        let src = self.source;
        let hex = if self.peek() == Some('{') {
            self.bump();
            let hex_start = self.pos;
            while self.peek().is_some_and(|c| c != '}') {
                self.bump();
            }
            if self.peek().is_none() {
                return Ok(None);
            }
            let hex_end = self.pos;
            self.bump(); // closing brace
            &src[hex_start..hex_end]
        } else {
            let hex_start = self.pos;
            let mut digits = 0;
            while digits < 4 && self.peek().is_some() {
                self.bump();
                digits += 1;
            }
            if digits != 4 {
                return Err(invalid());
            }
            &src[hex_start..self.pos]
        };

        let code = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
        match char::from_u32(code) {
            Some(decoded) => Ok(Some(decoded)),
            None => Err(invalid()),
        }
    }

    fn raw_string(
        &mut self,
        start: usize,
        had_whitespace: bool,
        had_newline: bool,
    ) -> Result<Token, ParseError> {
        self.bump(); // `r`
        let mut hashes = 0;
        while self.peek() == Some('#') {
            self.bump();
            hashes += 1;
        }
        self.bump(); // opening quote

        let mut text = String::new();
        loop {
            if self.at_raw_close(hashes) {
                self.pos += 1 + hashes; // `"` plus the hashes, all ASCII
                return Ok(self.token(TokenKind::Raw, text, start, had_whitespace, had_newline));
            }
            match self.bump() {
                Some(ch) => text.push(ch),
                None => {
                    return Err(ParseError::new("unclosed raw string", Span::new(start, self.pos)));
                }
            }
        }
    }

    /// Whether the cursor sits on `"` followed by exactly `hashes` `#`s.
    fn at_raw_close(&self, hashes: usize) -> bool {
        let rest = &self.source.as_bytes()[self.pos..];
        rest.len() > hashes && rest[0] == b'"' && rest[1..=hashes].iter().all(|&b| b == b'#')
    }

    fn heredoc(
        &mut self,
        start: usize,
        had_whitespace: bool,
        had_newline: bool,
    ) -> Result<Token, ParseError> {
        let src = self.source;
        self.bump(); // `<`
        self.bump(); // `<`

        let delim_start = self.pos;
        while self.peek().is_some_and(|c| c != '\n') {
            self.bump();
        }
        let delimiter = &src[delim_start..self.pos];
        if self.peek().is_some() {
            self.bump(); // newline ending the opening line
        }
        let content_start = self.pos;

        // Anything after the first `,` in the delimiter does not participate
        // in matching.
        let bare = delimiter.split(',').next().unwrap_or("");

        let mut lines: Vec<&str> = Vec::new();
        while self.pos < src.len() {
            let line_start = self.pos;
            while self.peek().is_some_and(|c| c != '\n') {
                self.bump();
            }
            let line = &src[line_start..self.pos];

            if line == bare {
                let text = lines.join("\n");
                return Ok(self.token(TokenKind::Heredoc, text, start, had_whitespace, had_newline));
            }

            let stripped = line.trim_start_matches([' ', '\t']);
            if stripped == bare {
                let indent = line.len() - stripped.len();
                let text = dedent_heredoc(&lines, indent);
                return Ok(self.token(TokenKind::Heredoc, text, start, had_whitespace, had_newline));
            }

            lines.push(line);
            if self.peek() == Some('\n') {
                self.bump();
            }
        }

        // No closing delimiter; the error points at the unmatched body.
        Err(ParseError::new("unexpected token", Span::new(content_start, self.pos)))
    }

    fn bare_scalar(&mut self, start: usize, had_whitespace: bool, had_newline: bool) -> Token {
        while self.peek().is_some_and(|c| !is_special(c)) {
            self.bump();
        }
        let text = self.source[start..self.pos].to_string();
        self.token(TokenKind::Scalar, text, start, had_whitespace, had_newline)
    }
}

/// Strip up to `indent` leading space/tab bytes from each line and rejoin.
fn dedent_heredoc(lines: &[&str], indent: usize) -> String {
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        let mut drop = 0;
        for b in line.bytes() {
            if drop >= indent || (b != b' ' && b != b'\t') {
                break;
            }
            drop += 1;
        }
        out.push(&line[drop..]);
    }
    out.join("\n")
}
