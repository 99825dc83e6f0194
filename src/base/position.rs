/// Position tracking for extracted entities
///
/// Stores the source location (line/column) of syntax nodes so that diagram
/// elements can be mapped back to the code they came from.
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A span representing a half-open range in source code (0-indexed for LSP compatibility)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// A position in source code (0-indexed)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a span from line/column coordinates
    pub fn from_coords(
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
    ) -> Self {
        Self {
            start: Position::new(start_line, start_col),
            end: Position::new(end_line, end_col),
        }
    }

    /// Zero-width span at a single position (a cursor).
    pub fn point(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// A span is well formed when its start does not come after its end.
    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if a position falls within this span
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }

    /// Check if `other` lies entirely inside this span.
    pub fn contains_span(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start.line, self.start.column, self.end.line, self.end.column
        )
    }
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Where an extracted entity originates: a file path plus a line/column span.
///
/// Immutable once created; cloning only bumps the path's reference count.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSpan {
    pub file_path: Arc<str>,
    pub start: Position,
    pub end: Position,
}

impl SourceSpan {
    pub fn new(file_path: impl Into<Arc<str>>, span: Span) -> Self {
        Self {
            file_path: file_path.into(),
            start: span.start,
            end: span.end,
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// Same file and fully covers `other`.
    pub fn contains(&self, other: &SourceSpan) -> bool {
        self.file_path == other.file_path && self.span().contains_span(&other.span())
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file_path, self.span())
    }
}
