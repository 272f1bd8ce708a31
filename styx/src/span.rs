/// Half-open byte span into the source string: `[start, end)`.
///
/// `start` and `end` must be valid UTF-8 slice boundaries for that same source
/// string. Nodes that have no source text (the implicit root key and the unit
/// keys synthesized for objects in key position) carry [`Span::SYNTHETIC`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: i32,
    pub end: i32,
}

impl Span {
    /// The `(-1, -1)` span marking a node that does not appear in the source.
    pub const SYNTHETIC: Span = Span { start: -1, end: -1 };

    /// Construct a span from byte offsets.
    pub fn new(start: usize, end: usize) -> Span {
        Span {
            start: start as i32,
            end: end as i32,
        }
    }

    /// Whether this span is the synthetic "not present in source" marker.
    pub fn is_synthetic(&self) -> bool {
        self.start < 0
    }

    /// The span from this span's start to `other`'s end.
    pub fn to(&self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
        }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
