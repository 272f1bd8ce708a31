//! Recursive-descent parser for Styx documents.
//!
//! Consumes the pull lexer one token at a time with a single token of
//! lookahead and produces the immutable [`Document`] tree. Structural rules
//! live here: duplicate keys, dotted-path expansion and its namespace checks,
//! key-kind validity, attribute shorthand, and tag-payload adjacency.
//!
//! Document-level entries share one namespace through [`path::PathState`];
//! each `{ … }` object carries its own scoped `seen_keys` map.

pub(crate) mod path;
mod sexp;
pub mod tree;

use std::collections::HashMap;

use tracing::trace;

use crate::error::ParseError;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::span::Span;

use path::{PathKind, PathState};
use tree::{Document, Entry, Object, Payload, Scalar, ScalarKind, Sequence, Tag, Value};

type ParseResult<T> = Result<T, ParseError>;

/// Parser state: the current token plus one token of lookahead.
pub struct Parser<'a> {
    source: &'a str,
    lexer: Lexer<'a>,
    current: Token,
    peeked: Option<Token>,
}

impl<'a> Parser<'a> {
    /// Create a parser over `source`, pulling the first token.
    pub fn new(source: &'a str) -> ParseResult<Self> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token()?;
        Ok(Parser {
            source,
            lexer,
            current,
            peeked: None,
        })
    }

    /// Parse a complete document.
    pub fn parse(mut self) -> ParseResult<Document> {
        let start = self.current.span;
        let mut entries = Vec::new();
        let mut path_state = PathState::new();

        while self.check(TokenKind::Comma) {
            self.bump()?;
        }

        // Explicit root object: `{ … }` as the whole document.
        if self.check(TokenKind::LBrace) {
            let obj = self.parse_object()?;
            entries.push(Entry {
                key: Value::unit(Span::SYNTHETIC),
                value: Value::object(obj),
            });

            // Only commas may follow; anything else up to EOF is trailing
            // content (and pulling those tokens may surface lexer errors).
            while self.check(TokenKind::Comma) {
                self.bump()?;
            }

            if !self.check(TokenKind::Eof) {
                let trailing_start = self.current.span.start;
                while !self.check(TokenKind::Eof) {
                    self.bump()?;
                }
                let trailing_end = self.current.span.start;
                return Err(ParseError::new(
                    "trailing content after explicit root object",
                    Span {
                        start: trailing_start,
                        end: trailing_end,
                    },
                ));
            }

            return Ok(Document {
                entries,
                span: start.to(self.current.span),
            });
        }

        while !self.check(TokenKind::Eof) {
            if let Some(entry) = self.parse_root_entry(&mut path_state)? {
                entries.push(entry);
            }
        }

        Ok(Document {
            entries,
            span: start.to(self.current.span),
        })
    }

    fn bump(&mut self) -> ParseResult<Token> {
        let next = match self.peeked.take() {
            Some(token) => token,
            None => self.lexer.next_token()?,
        };
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn peek(&mut self) -> ParseResult<&Token> {
        if self.peeked.is_none() {
            let token = self.lexer.next_token()?;
            self.peeked = Some(token);
        }
        match &self.peeked {
            Some(token) => Ok(token),
            None => unreachable!("lookahead was just filled"),
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if !self.check(kind) {
            return Err(ParseError::new(
                format!("expected {kind}, got {}", self.current.kind),
                self.current.span,
            ));
        }
        self.bump()
    }

    /// Whether the current token ends the enclosing entry list.
    fn at_entry_list_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Eof | TokenKind::RBrace)
    }

    /// Parse an entry at document level, recording its key in `path_state`.
    fn parse_root_entry(&mut self, path_state: &mut PathState) -> ParseResult<Option<Entry>> {
        while self.check(TokenKind::Comma) {
            self.bump()?;
        }

        if self.check(TokenKind::Gt) {
            return Err(ParseError::new("expected a value", self.current.span));
        }
        if self.at_entry_list_end() {
            return Ok(None);
        }

        let key = self.parse_value()?;
        trace!(span = %key.span, "document entry");

        // `{ … }` in key position: synthetic unit key, the object is the
        // value. One further same-line value is parsed and dropped so that
        // `"name" { … } rest` degrades gracefully.
        if matches!(key.payload, Some(Payload::Object(_))) {
            if !self.current.had_newline_before
                && !matches!(
                    self.current.kind,
                    TokenKind::Eof | TokenKind::RBrace | TokenKind::Comma
                )
            {
                self.parse_value()?;
            }
            return Ok(Some(Entry {
                key: Value::unit(Span::SYNTHETIC),
                value: key,
            }));
        }

        if let Some(text) = bare_scalar_text(&key) {
            if text.contains('.') {
                return self
                    .expand_dotted_path_root(&text, key.span, path_state)
                    .map(Some);
            }
        }

        let key_text = key_text(&key);
        self.validate_key(&key)?;

        // A newline (or end of the entry list) before any value makes the
        // value an implicit unit at the key's span.
        if self.current.had_newline_before || self.at_entry_list_end() {
            if let Some(text) = key_text {
                path_state.check_and_update(
                    std::slice::from_ref(&text),
                    key.span,
                    PathKind::Terminal,
                )?;
            }
            let value = Value::unit(key.span);
            return Ok(Some(Entry { key, value }));
        }

        let value = self.parse_value()?;

        if let Some(text) = key_text {
            let kind = if matches!(value.payload, Some(Payload::Object(_))) {
                PathKind::Object
            } else {
                PathKind::Terminal
            };
            path_state.check_and_update(std::slice::from_ref(&text), key.span, kind)?;
        }

        Ok(Some(Entry { key, value }))
    }

    /// Parse an entry inside `{ … }`, recording its key in `seen_keys`.
    fn parse_object_entry(
        &mut self,
        seen_keys: &mut HashMap<String, Span>,
    ) -> ParseResult<Option<Entry>> {
        while self.check(TokenKind::Comma) {
            self.bump()?;
        }

        if self.check(TokenKind::Gt) {
            return Err(ParseError::new("expected a value", self.current.span));
        }
        if self.at_entry_list_end() {
            return Ok(None);
        }

        let key = self.parse_value()?;

        if matches!(key.payload, Some(Payload::Object(_))) {
            if !self.current.had_newline_before
                && !matches!(
                    self.current.kind,
                    TokenKind::Eof | TokenKind::RBrace | TokenKind::Comma
                )
            {
                self.parse_value()?;
            }
            return Ok(Some(Entry {
                key: Value::unit(Span::SYNTHETIC),
                value: key,
            }));
        }

        if let Some(text) = bare_scalar_text(&key) {
            if text.contains('.') {
                return self
                    .expand_dotted_path_object(&text, key.span, seen_keys)
                    .map(Some);
            }
        }

        if let Some(text) = key_text(&key) {
            if seen_keys.contains_key(&text) {
                return Err(ParseError::new("duplicate key", key.span));
            }
            seen_keys.insert(text, key.span);
        }

        self.validate_key(&key)?;

        if self.current.had_newline_before || self.at_entry_list_end() {
            let value = Value::unit(key.span);
            return Ok(Some(Entry { key, value }));
        }

        let value = self.parse_value()?;
        Ok(Some(Entry { key, value }))
    }

    /// Reject value shapes that cannot be keys.
    fn validate_key(&self, key: &Value) -> ParseResult<()> {
        match &key.payload {
            Some(Payload::Sequence(_)) => Err(ParseError::new("invalid key", key.span)),
            Some(Payload::Scalar(scalar)) if scalar.kind == ScalarKind::Heredoc => Err(
                ParseError::new("invalid key", self.heredoc_marker_span(scalar.span)),
            ),
            _ => Ok(()),
        }
    }

    /// Span of just the heredoc opening line (`<<TAG\n`), used for key errors
    /// so they do not swallow the whole body.
    fn heredoc_marker_span(&self, span: Span) -> Span {
        let text = &self.source[span.start as usize..span.end as usize];
        let end = match text.find('\n') {
            Some(idx) => idx + 1,
            None => text.len(),
        };
        Span {
            start: span.start,
            end: span.start + end as i32,
        }
    }

    /// Expand a dotted key at document level, checking the full segment list
    /// against the path tracker.
    fn expand_dotted_path_root(
        &mut self,
        path_text: &str,
        span: Span,
        path_state: &mut PathState,
    ) -> ParseResult<Entry> {
        let segments: Vec<String> = path_text.split('.').map(str::to_owned).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(ParseError::new("invalid key", span));
        }

        let segment_spans = segment_spans(&segments, span);

        let value = self.parse_value()?;

        let kind = if matches!(value.payload, Some(Payload::Object(_))) {
            PathKind::Object
        } else {
            PathKind::Terminal
        };
        // Errors report the whole dotted key, not a single segment.
        path_state.check_and_update(&segments, span, kind)?;

        // Build the nested objects from the inside out. Each synthesized
        // object spans from the previous segment's start to the last
        // segment's end.
        let last_key_end = segment_spans[segments.len() - 1].end;
        let mut result = value;
        for i in (1..segments.len()).rev() {
            let seg_span = segment_spans[i];
            let segment_key = Value::scalar(Scalar {
                text: segments[i].clone(),
                kind: ScalarKind::Bare,
                span: seg_span,
            });
            let obj_span = Span {
                start: segment_spans[i - 1].start,
                end: last_key_end,
            };
            result = Value::object(Object {
                entries: vec![Entry {
                    key: segment_key,
                    value: result,
                }],
                span: obj_span,
            });
        }

        let outer_key = Value::scalar(Scalar {
            text: segments[0].clone(),
            kind: ScalarKind::Bare,
            span: segment_spans[0],
        });
        Ok(Entry {
            key: outer_key,
            value: result,
        })
    }

    /// Expand a dotted key inside an object. Only the first segment takes
    /// part in duplicate checking, and the synthesized objects reuse the
    /// original key's span.
    fn expand_dotted_path_object(
        &mut self,
        path_text: &str,
        span: Span,
        seen_keys: &mut HashMap<String, Span>,
    ) -> ParseResult<Entry> {
        let segments: Vec<String> = path_text.split('.').map(str::to_owned).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(ParseError::new("invalid key", span));
        }

        if seen_keys.contains_key(&segments[0]) {
            return Err(ParseError::new("duplicate key", span));
        }
        seen_keys.insert(segments[0].clone(), span);

        let segment_spans = segment_spans(&segments, span);

        let value = self.parse_value()?;

        let mut result = value;
        for i in (1..segments.len()).rev() {
            let segment_key = Value::scalar(Scalar {
                text: segments[i].clone(),
                kind: ScalarKind::Bare,
                span: segment_spans[i],
            });
            result = Value::object(Object {
                entries: vec![Entry {
                    key: segment_key,
                    value: result,
                }],
                span,
            });
        }

        let outer_key = Value::scalar(Scalar {
            text: segments[0].clone(),
            kind: ScalarKind::Bare,
            span: segment_spans[0],
        });
        Ok(Entry {
            key: outer_key,
            value: result,
        })
    }

    /// Parse a value in general position.
    fn parse_value(&mut self) -> ParseResult<Value> {
        if self.check(TokenKind::At) {
            let at = self.bump()?;
            // A glued non-terminator means this was meant as a tag.
            if !self.current.had_whitespace_before
                && !matches!(
                    self.current.kind,
                    TokenKind::Eof
                        | TokenKind::RBrace
                        | TokenKind::RParen
                        | TokenKind::Comma
                        | TokenKind::LBrace
                        | TokenKind::LParen
                )
            {
                return Err(ParseError::new(
                    "invalid tag name",
                    at.span.to(self.current.span),
                ));
            }
            return Ok(Value::unit(at.span));
        }

        if self.check(TokenKind::Tag) {
            return self.parse_tag_value();
        }

        if self.check(TokenKind::LBrace) {
            let obj = self.parse_object()?;
            return Ok(Value::object(obj));
        }

        if self.check(TokenKind::LParen) {
            let seq = self.parse_sequence()?;
            return Ok(Value::sequence(seq));
        }

        if self.check(TokenKind::Scalar) {
            let scalar_token = self.bump()?;

            // `key>value` attribute shorthand, but only when a value actually
            // follows the `>` on the same line.
            if self.check(TokenKind::Gt) && !self.current.had_whitespace_before {
                let after = self.peek()?;
                if !after.had_newline_before && after.kind != TokenKind::Eof {
                    return self.parse_attributes_starting_with(scalar_token);
                }
            }

            return Ok(Value::scalar(Scalar {
                text: scalar_token.text,
                kind: ScalarKind::Bare,
                span: scalar_token.span,
            }));
        }

        let scalar = self.parse_scalar()?;
        Ok(Value::scalar(scalar))
    }

    /// Parse a tag with an optional adjacent payload.
    fn parse_tag_value(&mut self) -> ParseResult<Value> {
        let tag_token = self.bump()?;
        let start = tag_token.span.start;
        // The token span includes the `@`; the tag's own span is the name.
        let tag = Tag {
            name: tag_token.text,
            span: Span {
                start: tag_token.span.start + 1,
                end: tag_token.span.end,
            },
        };

        if !self.current.had_whitespace_before {
            if self.check(TokenKind::LBrace) {
                let obj = self.parse_object()?;
                return Ok(Value {
                    span: obj.span,
                    tag: Some(tag),
                    payload: Some(Payload::Object(obj)),
                });
            }
            if self.check(TokenKind::LParen) {
                let seq = self.parse_sequence()?;
                return Ok(Value {
                    span: seq.span,
                    tag: Some(tag),
                    payload: Some(Payload::Sequence(seq)),
                });
            }
            if matches!(
                self.current.kind,
                TokenKind::Quoted | TokenKind::Raw | TokenKind::Heredoc
            ) {
                let scalar = self.parse_scalar()?;
                return Ok(Value {
                    span: scalar.span,
                    tag: Some(tag),
                    payload: Some(Payload::Scalar(scalar)),
                });
            }
            if self.check(TokenKind::At) {
                let at = self.bump()?;
                return Ok(Value {
                    span: at.span,
                    tag: Some(tag),
                    payload: None,
                });
            }
            // Something glued straight onto the tag, like `@name/junk`.
            if !matches!(
                self.current.kind,
                TokenKind::Eof | TokenKind::RBrace | TokenKind::RParen | TokenKind::Comma
            ) {
                return Err(ParseError::new(
                    "invalid tag name",
                    Span {
                        start,
                        end: self.current.span.end,
                    },
                ));
            }
        }

        Ok(Value {
            span: Span {
                start,
                end: tag.span.end,
            },
            tag: Some(tag),
            payload: None,
        })
    }

    /// Parse `key>value key>value …` after the first key has been consumed.
    fn parse_attributes_starting_with(&mut self, first_key: Token) -> ParseResult<Value> {
        let start = first_key.span.start;
        let mut attrs = Vec::new();

        self.expect(TokenKind::Gt)?;
        let key = Value::scalar(Scalar {
            text: first_key.text,
            kind: ScalarKind::Bare,
            span: first_key.span,
        });
        let value = self.parse_attribute_value()?;
        let mut end = value.span.end;
        attrs.push(Entry { key, value });

        // Continuation pairs: a same-line scalar immediately followed by `>`.
        loop {
            if !self.check(TokenKind::Scalar) || self.current.had_newline_before {
                break;
            }
            {
                let next = self.peek()?;
                if next.kind != TokenKind::Gt || next.had_whitespace_before {
                    break;
                }
            }

            let key_token = self.bump()?;
            self.bump()?; // the `>`

            let key = Value::scalar(Scalar {
                text: key_token.text,
                kind: ScalarKind::Bare,
                span: key_token.span,
            });
            let value = self.parse_attribute_value()?;
            end = value.span.end;
            attrs.push(Entry { key, value });
        }

        Ok(Value::object(Object {
            entries: attrs,
            span: Span { start, end },
        }))
    }

    /// Parse a value in attribute position.
    ///
    /// Identical to [`Parser::parse_value`] except that a standalone `@` is a
    /// unit: continuation scanning has already bounded the attribute value, so
    /// the glued-junk tag error cannot apply here.
    fn parse_attribute_value(&mut self) -> ParseResult<Value> {
        if self.check(TokenKind::LBrace) {
            let obj = self.parse_object()?;
            return Ok(Value::object(obj));
        }
        if self.check(TokenKind::LParen) {
            let seq = self.parse_sequence()?;
            return Ok(Value::sequence(seq));
        }
        if self.check(TokenKind::Tag) {
            return self.parse_tag_value();
        }
        if self.check(TokenKind::At) {
            let at = self.bump()?;
            return Ok(Value::unit(at.span));
        }
        let scalar = self.parse_scalar()?;
        Ok(Value::scalar(scalar))
    }

    fn parse_scalar(&mut self) -> ParseResult<Scalar> {
        let kind = match self.current.kind {
            TokenKind::Scalar => ScalarKind::Bare,
            TokenKind::Quoted => ScalarKind::Quoted,
            TokenKind::Raw => ScalarKind::Raw,
            TokenKind::Heredoc => ScalarKind::Heredoc,
            other => {
                return Err(ParseError::new(
                    format!("expected scalar, got {other}"),
                    self.current.span,
                ));
            }
        };
        let token = self.bump()?;
        Ok(Scalar {
            text: token.text,
            kind,
            span: token.span,
        })
    }

    fn parse_object(&mut self) -> ParseResult<Object> {
        let open = self.expect(TokenKind::LBrace)?;
        let mut entries = Vec::new();
        let mut seen_keys: HashMap<String, Span> = HashMap::new();

        while !matches!(self.current.kind, TokenKind::RBrace | TokenKind::Eof) {
            if let Some(entry) = self.parse_object_entry(&mut seen_keys)? {
                entries.push(entry);
            }
            // Commas between entries are separators, nothing more.
            if self.check(TokenKind::Comma) {
                self.bump()?;
            }
        }

        if self.check(TokenKind::Eof) {
            return Err(ParseError::new("unclosed object (missing `}`)", open.span));
        }

        let close = self.expect(TokenKind::RBrace)?;
        Ok(Object {
            entries,
            span: open.span.to(close.span),
        })
    }

    fn parse_sequence(&mut self) -> ParseResult<Sequence> {
        let open = self.expect(TokenKind::LParen)?;
        let mut items = Vec::new();

        while !matches!(self.current.kind, TokenKind::RParen | TokenKind::Eof) {
            if self.check(TokenKind::Comma) {
                return Err(ParseError::new(
                    "unexpected `,` in sequence (sequences are whitespace-separated, not comma-separated)",
                    self.current.span,
                ));
            }
            items.push(self.parse_value()?);
        }

        if self.check(TokenKind::Eof) {
            return Err(ParseError::new("unclosed sequence (missing `)`)", open.span));
        }

        let close = self.expect(TokenKind::RParen)?;
        Ok(Sequence {
            items,
            span: open.span.to(close.span),
        })
    }
}

/// The text of a bare-scalar key, if the key is one.
fn bare_scalar_text(key: &Value) -> Option<String> {
    match &key.payload {
        Some(Payload::Scalar(scalar)) if scalar.kind == ScalarKind::Bare => {
            Some(scalar.text.clone())
        }
        _ => None,
    }
}

/// Derive the text a key occupies in its namespace.
///
/// Scalar-payload keys use the scalar text; tag-only keys use `@name`. Other
/// keys (units, objects handled upstream) are exempt from tracking.
fn key_text(key: &Value) -> Option<String> {
    if let Some(Payload::Scalar(scalar)) = &key.payload {
        return Some(scalar.text.clone());
    }
    if let (Some(tag), None) = (&key.tag, &key.payload) {
        return Some(format!("@{}", tag.name));
    }
    None
}

/// Byte spans of each dotted-path segment, walking the original key span.
fn segment_spans(segments: &[String], span: Span) -> Vec<Span> {
    let mut spans = Vec::with_capacity(segments.len());
    let mut offset = span.start;
    for segment in segments {
        let len = segment.len() as i32;
        spans.push(Span {
            start: offset,
            end: offset + len,
        });
        offset += len + 1; // the dot
    }
    spans
}
