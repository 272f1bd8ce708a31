use std::fmt;

use crate::span::Span;

/// Token kinds produced by the lexer.
///
/// The `Display` names are part of the error-message contract
/// (`expected gt, got scalar` and friends).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A bare (unquoted) scalar run.
    Scalar,
    /// `"…"` with escapes already decoded.
    Quoted,
    /// `r#"…"#` with no escape processing.
    Raw,
    /// `<<NAME … NAME` with dedent already applied.
    Heredoc,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// A standalone `@`.
    At,
    /// `@name` where `name` matches `[A-Za-z_][A-Za-z0-9_-]*`.
    Tag,
    /// `>`
    Gt,
    /// End of input.
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenKind::Scalar => "scalar",
            TokenKind::Quoted => "quoted",
            TokenKind::Raw => "raw",
            TokenKind::Heredoc => "heredoc",
            TokenKind::LBrace => "lbrace",
            TokenKind::RBrace => "rbrace",
            TokenKind::LParen => "lparen",
            TokenKind::RParen => "rparen",
            TokenKind::Comma => "comma",
            TokenKind::At => "at",
            TokenKind::Tag => "tag",
            TokenKind::Gt => "gt",
            TokenKind::Eof => "eof",
        })
    }
}

/// A lexer token.
///
/// `text` is the literal content with escapes and heredoc dedent already
/// applied (for a `Tag` it is the name without the `@`). `span` is a byte
/// offset range into the original source, `[start, end)`.
///
/// The two flags describe the whitespace/comment run skipped immediately
/// before this token. They are part of the grammar contract: tag-payload
/// adjacency, attribute-shorthand continuation, and implicit units on
/// newlines all dispatch on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
    /// Any whitespace or comment was skipped before this token.
    pub had_whitespace_before: bool,
    /// At least one `\n` was skipped before this token.
    pub had_newline_before: bool,
}
