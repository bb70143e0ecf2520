//! Source location tracking for error reporting.
//!
//! The parse tree producer is external, so spans are whatever it hands us.
//! Diagnostics only ever print the line, but the column is kept for tooling.

use std::fmt;

/// A span of source code, represented by its starting position.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    /// Create a new span from a line, column, and length.
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// Create a zero-length span at a position.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    /// A span that only knows its line.
    #[inline]
    pub fn line(line: u32) -> Self {
        Self::point(line, 1)
    }

    /// Whether this span is empty (zero length).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_basics() {
        let span = Span::new(1, 5, 10);
        assert!(!span.is_empty());
        assert!(Span::point(1, 5).is_empty());
    }

    #[test]
    fn span_display_reports_line() {
        assert_eq!(Span::new(3, 15, 5).to_string(), "line 3");
        assert_eq!(format!("{:?}", Span::new(3, 15, 5)), "3:15");
    }

    #[test]
    fn line_only_span() {
        let span = Span::line(7);
        assert_eq!(span.line, 7);
        assert_eq!(span.col, 1);
    }
}
