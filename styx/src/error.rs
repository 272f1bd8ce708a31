use thiserror::Error;

use crate::span::Span;

/// A fatal parse error with location information.
///
/// `span` is a byte range into the original source. The rendered form is
/// stable (`parse error at {start}-{end}: {message}`); the compliance output
/// embeds it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at {span}: {message}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}
