//! Source location tracking for tokens and AST nodes.

use serde::Serialize;

/// A region of the source text.
///
/// `start`/`end` are byte offsets (end exclusive). `line`/`column` are the
/// 1-based position of the first character and `end_line`/`end_column` the
/// position right after the last one. Columns count characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// Line of the first character.
    pub line: usize,
    /// Column of the first character.
    pub column: usize,
    /// Line right after the last character.
    pub end_line: usize,
    /// Column right after the last character.
    pub end_column: usize,
}

impl Span {
    /// Creates a single-line span of ASCII text.
    #[must_use]
    pub const fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
            end_line: line,
            end_column: column + (end - start),
        }
    }

    /// Sets the end position.
    #[must_use]
    pub const fn with_end(mut self, end_line: usize, end_column: usize) -> Self {
        self.end_line = end_line;
        self.end_column = end_column;
        self
    }

    /// Returns the length of the span in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if the span is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Position right after the last character.
    #[must_use]
    pub const fn end_position(&self) -> (usize, usize) {
        (self.end_line, self.end_column)
    }

    /// Merges two spans into one that covers both.
    ///
    /// Line and column are taken from whichever span starts first.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        let (start, line, column) = if self.start <= other.start {
            (self.start, self.line, self.column)
        } else {
            (other.start, other.line, other.column)
        };
        let last = if self.end > other.end { self } else { other };
        Self {
            start,
            end: last.end,
            line,
            column,
            end_line: last.end_line,
            end_column: last.end_column,
        }
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::new(0, 0, 1, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_len() {
        let span = Span::new(5, 10, 1, 6);
        assert_eq!(span.len(), 5);
        assert!(!span.is_empty());
        assert!(Span::new(5, 5, 1, 6).is_empty());
    }

    #[test]
    fn test_span_merge_keeps_first_position() {
        let a = Span::new(14, 21, 1, 15);
        let b = Span::new(2, 6, 1, 3);
        let merged = a.merge(b);
        assert_eq!(merged, Span::new(2, 21, 1, 3));
        assert_eq!(merged.end_position(), (1, 22));
    }

    #[test]
    fn test_end_position() {
        let span = Span::new(13, 21, 1, 14);
        assert_eq!(span.end_position(), (1, 22));
        let wrapped = Span::new(13, 18, 1, 14).with_end(2, 3);
        assert_eq!(wrapped.end_position(), (2, 3));
    }
}
