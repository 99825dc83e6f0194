//! Conversion between byte offsets and 0-indexed line/column positions.
//!
//! Columns count Unicode scalar values from the start of the line.

use text_size::{TextRange, TextSize};

use super::position::{Position, Span};

/// A 0-indexed line/column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl From<LineCol> for Position {
    fn from(lc: LineCol) -> Self {
        Position::new(lc.line as usize, lc.col as usize)
    }
}

/// Line start table for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    text: std::sync::Arc<str>,
    line_starts: Vec<TextSize>,
}

impl LineIndex {
    pub fn new(text: impl Into<std::sync::Arc<str>>) -> Self {
        let text = text.into();
        let mut line_starts = vec![TextSize::new(0)];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(TextSize::new(offset as u32 + 1));
            }
        }
        Self { text, line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn len(&self) -> TextSize {
        TextSize::of(self.text.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn line_text(&self, line: usize) -> Option<&str> {
        let start = *self.line_starts.get(line)?;
        let end = self
            .line_starts
            .get(line + 1)
            .copied()
            .unwrap_or_else(|| self.len());
        let text = &self.text[TextRange::new(start, end)];
        Some(text.strip_suffix('\n').unwrap_or(text))
    }

    /// Convert a byte offset into a line/column pair.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(self.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let start = self.line_starts[line];
        let col = self.text[TextRange::new(start, offset)].chars().count();
        LineCol {
            line: line as u32,
            col: col as u32,
        }
    }

    pub fn position(&self, offset: TextSize) -> Position {
        self.line_col(offset).into()
    }

    /// Convert a position back into a byte offset.
    ///
    /// Returns `None` when the line does not exist or the column lies past the
    /// end of the line.
    pub fn offset(&self, position: Position) -> Option<TextSize> {
        let line_text = self.line_text(position.line)?;
        let start = self.line_starts[position.line];
        let mut chars = line_text.char_indices();
        let byte = if position.column == line_text.chars().count() {
            line_text.len()
        } else {
            chars.nth(position.column).map(|(byte, _)| byte)?
        };
        Some(start + TextSize::new(byte as u32))
    }

    pub fn span(&self, range: TextRange) -> Span {
        Span::new(self.position(range.start()), self.position(range.end()))
    }

    /// Convert a span into a byte range, `None` if either end is out of bounds
    /// or the span is inverted.
    pub fn range(&self, span: Span) -> Option<TextRange> {
        if !span.is_valid() {
            return None;
        }
        let start = self.offset(span.start)?;
        let end = self.offset(span.end)?;
        Some(TextRange::new(start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_round_trip_on_multiline_text() {
        let index = LineIndex::new("service {\n  int x;\n}\n");
        let offset = index.offset(Position::new(1, 6)).unwrap();
        assert_eq!(u32::from(offset), 16);
        assert_eq!(index.position(offset), Position::new(1, 6));
    }

    #[test]
    fn test_offset_rejects_out_of_range_positions() {
        let index = LineIndex::new("ab\ncd");
        assert!(index.offset(Position::new(5, 0)).is_none());
        assert!(index.offset(Position::new(0, 3)).is_none());
        assert_eq!(index.offset(Position::new(0, 2)), Some(TextSize::new(2)));
    }

    #[test]
    fn test_columns_count_characters_not_bytes() {
        let index = LineIndex::new("\"é\" x");
        let offset = index.offset(Position::new(0, 4)).unwrap();
        assert_eq!(&"\"é\" x"[usize::from(offset)..], "x");
    }
}
