//! Document-level namespace tracking.
//!
//! Nested keys and dotted-path keys share one namespace at document root.
//! The tracker enforces two rules beyond plain duplicate detection: a path
//! that has been closed by a diverging sibling cannot be reopened, and a path
//! holding a terminal value cannot be nested into.

use std::collections::{HashMap, HashSet};

use crate::error::ParseError;
use crate::span::Span;

/// What kind of value a fully-qualified path holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// An explicit object value or an intermediate segment.
    Object,
    /// A scalar, sequence, unit, or tag-only value.
    Terminal,
}

/// Tracker state threaded through document-level entry parsing.
#[derive(Debug, Default)]
pub struct PathState {
    /// Segments of the most recently recorded entry.
    current_path: Vec<String>,
    /// Fully-qualified paths closed by a subsequent diverging entry.
    closed_paths: HashSet<String>,
    /// Fully-qualified path -> (kind, span of the key that assigned it).
    assigned_paths: HashMap<String, (PathKind, Span)>,
}

impl PathState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `path` against the recorded namespace and record it.
    ///
    /// `span` is the key span reported on failure. Divergent branches of the
    /// previously recorded path are closed before `path` is recorded, so a
    /// later entry cannot reopen them.
    pub fn check_and_update(
        &mut self,
        path: &[String],
        span: Span,
        kind: PathKind,
    ) -> Result<(), ParseError> {
        let full_path = path.join(".");

        if let Some((existing_kind, _)) = self.assigned_paths.get(&full_path) {
            return Err(match existing_kind {
                PathKind::Terminal => ParseError::new("duplicate key", span),
                PathKind::Object => ParseError::new(
                    format!("cannot reopen path `{full_path}` after sibling appeared"),
                    span,
                ),
            });
        }

        for i in 1..path.len() {
            let prefix = path[..i].join(".");
            if self.closed_paths.contains(&prefix) {
                return Err(ParseError::new(
                    format!("cannot reopen path `{prefix}` after sibling appeared"),
                    span,
                ));
            }
            if let Some((PathKind::Terminal, _)) = self.assigned_paths.get(&prefix) {
                return Err(ParseError::new(
                    format!("cannot nest into `{prefix}` which has a terminal value"),
                    span,
                ));
            }
        }

        // Every branch of the previous path below the common prefix is now
        // closed: a sibling has appeared after it.
        let common_len = path
            .iter()
            .zip(&self.current_path)
            .take_while(|(a, b)| a == b)
            .count();
        for i in common_len..self.current_path.len() {
            self.closed_paths.insert(self.current_path[..=i].join("."));
        }

        for i in 0..path.len().saturating_sub(1) {
            let prefix = path[..=i].join(".");
            self.assigned_paths
                .entry(prefix)
                .or_insert((PathKind::Object, span));
        }

        self.assigned_paths.insert(full_path, (kind, span));
        self.current_path = path.to_vec();
        Ok(())
    }

    /// The recorded kind for a fully-qualified dotted path, if any.
    #[allow(dead_code)]
    pub fn assigned_kind(&self, full_path: &str) -> Option<PathKind> {
        self.assigned_paths.get(full_path).map(|(kind, _)| *kind)
    }

    /// All fully-qualified paths recorded so far.
    #[allow(dead_code)]
    pub fn assigned_paths(&self) -> impl Iterator<Item = &str> {
        self.assigned_paths.keys().map(String::as_str)
    }
}
