//! The parsed document tree.
//!
//! Nodes are built bottom-up during parsing and immutable afterwards; the
//! tree owns its children transitively. All spans are byte offsets into the
//! original source except the synthetic `(-1, -1)` keys.

use crate::span::Span;

/// The kind of scalar literal a [`Scalar`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Bare,
    Quoted,
    Raw,
    Heredoc,
}

impl ScalarKind {
    /// Lowercase name used by the S-expression dump.
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Bare => "bare",
            ScalarKind::Quoted => "quoted",
            ScalarKind::Raw => "raw",
            ScalarKind::Heredoc => "heredoc",
        }
    }
}

/// A scalar value; `text` has escapes and heredoc dedent applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    pub text: String,
    pub kind: ScalarKind,
    pub span: Span,
}

/// A tag annotation. `span` covers the identifier characters after the `@`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub span: Span,
}

/// An ordered sequence of values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub items: Vec<Value>,
    pub span: Span,
}

/// An object: ordered entries whose derived key texts are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    pub entries: Vec<Entry>,
    pub span: Span,
}

/// The payload carried by a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Scalar(Scalar),
    Sequence(Sequence),
    Object(Object),
}

/// A Styx value: an optional tag plus an optional payload.
///
/// A value with neither is a **unit** (implicit values, synthetic keys).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    pub span: Span,
    pub tag: Option<Tag>,
    pub payload: Option<Payload>,
}

impl Value {
    pub fn unit(span: Span) -> Value {
        Value {
            span,
            tag: None,
            payload: None,
        }
    }

    pub fn scalar(scalar: Scalar) -> Value {
        Value {
            span: scalar.span,
            tag: None,
            payload: Some(Payload::Scalar(scalar)),
        }
    }

    pub fn sequence(sequence: Sequence) -> Value {
        Value {
            span: sequence.span,
            tag: None,
            payload: Some(Payload::Sequence(sequence)),
        }
    }

    pub fn object(object: Object) -> Value {
        Value {
            span: object.span,
            tag: None,
            payload: Some(Payload::Object(object)),
        }
    }

    pub fn is_unit(&self) -> bool {
        self.tag.is_none() && self.payload.is_none()
    }
}

/// A key-value pair in a document or object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: Value,
    pub value: Value,
}

/// A parsed Styx document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub entries: Vec<Entry>,
    pub span: Span,
}
