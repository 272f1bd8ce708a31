//! S-expression rendering of documents and errors.
//!
//! The compliance harness diffs this output byte-for-byte against a reference
//! implementation, so shapes, the two-space indent, and the escaping table
//! must not drift.

use crate::error::ParseError;
use crate::parser::tree::{Document, Entry, Payload, Value};

const INDENT: &str = "  ";

impl Document {
    /// Render the document as an S-expression.
    ///
    /// The document line always prints the synthetic `[-1, -1]` span.
    pub fn to_sexp(&self) -> String {
        if self.entries.is_empty() {
            return "(document [-1, -1]\n)".to_string();
        }
        let entries: Vec<String> = self.entries.iter().map(|e| entry_sexp(e, 1)).collect();
        format!("(document [-1, -1]\n{}\n)", entries.join("\n"))
    }
}

impl ParseError {
    /// Render the error as an S-expression; only `\` is escaped in the
    /// message.
    pub fn to_sexp(&self) -> String {
        let escaped = self.message.replace('\\', "\\\\");
        format!(
            "(error [{}, {}] \"parse error at {}-{}: {}\")",
            self.span.start, self.span.end, self.span.start, self.span.end, escaped
        )
    }
}

fn entry_sexp(entry: &Entry, indent: usize) -> String {
    let prefix = INDENT.repeat(indent);
    let key = value_sexp(&entry.key, indent + 1);
    let value = value_sexp(&entry.value, indent + 1);
    format!("{prefix}(entry\n{prefix}  {key}\n{prefix}  {value})")
}

fn value_sexp(value: &Value, indent: usize) -> String {
    let prefix = INDENT.repeat(indent);
    match (&value.tag, &value.payload) {
        (None, None) => format!("(unit [{}, {}])", value.span.start, value.span.end),
        (Some(tag), None) => format!(
            "(tag [{}, {}] \"{}\")",
            value.span.start, value.span.end, tag.name
        ),
        (Some(tag), Some(payload)) => format!(
            "(tag [{}, {}] \"{}\"\n{prefix}  {})",
            value.span.start,
            value.span.end,
            tag.name,
            payload_sexp(payload, indent + 1)
        ),
        (None, Some(payload)) => payload_sexp(payload, indent),
    }
}

fn payload_sexp(payload: &Payload, indent: usize) -> String {
    let prefix = INDENT.repeat(indent);
    match payload {
        Payload::Scalar(scalar) => format!(
            "(scalar [{}, {}] {} \"{}\")",
            scalar.span.start,
            scalar.span.end,
            scalar.kind.name(),
            escape(&scalar.text)
        ),
        Payload::Sequence(seq) => {
            if seq.items.is_empty() {
                return format!("(sequence [{}, {}])", seq.span.start, seq.span.end);
            }
            let items: Vec<String> = seq
                .items
                .iter()
                .map(|item| format!("{prefix}  {}", value_sexp(item, indent + 1)))
                .collect();
            format!(
                "(sequence [{}, {}]\n{})",
                seq.span.start,
                seq.span.end,
                items.join("\n")
            )
        }
        Payload::Object(obj) => {
            if obj.entries.is_empty() {
                return format!("(object [{}, {}])", obj.span.start, obj.span.end);
            }
            let entries: Vec<String> = obj
                .entries
                .iter()
                .map(|e| entry_sexp(e, indent + 1))
                .collect();
            format!(
                "(object [{}, {}]\n{}\n{prefix})",
                obj.span.start,
                obj.span.end,
                entries.join("\n")
            )
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}
