//! Source location spans.
//!
//! A span records the byte range of a node plus the line and column of its
//! first character. Line `0` marks a node with no location, which is what
//! synthesized nodes carry until `fix_missing_locations` backfills them.

use std::fmt;

/// Source location span.
///
/// - `start`/`end`: byte offsets (end exclusive)
/// - `line`: 1-based line of `start`, `0` when unknown
/// - `col`: 0-based column of `start`
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: u32,
    pub end: u32,
    pub line: u32,
    pub col: u32,
}

impl Span {
    /// Span for synthesized nodes without a source location.
    pub const DUMMY: Span = Span {
        start: 0,
        end: 0,
        line: 0,
        col: 0,
    };

    #[inline]
    pub const fn new(start: u32, end: u32, line: u32, col: u32) -> Self {
        Span {
            start,
            end,
            line,
            col,
        }
    }

    /// Whether this span lacks a source location.
    #[inline]
    pub const fn is_dummy(&self) -> bool {
        self.line == 0
    }

    /// Length of the span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Merge two spans into one covering both.
    ///
    /// The line and column come from whichever span starts first.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        if self.is_dummy() {
            return other;
        }
        if other.is_dummy() {
            return self;
        }
        let (line, col) = if other.start < self.start {
            (other.line, other.col)
        } else {
            (self.line, self.col)
        };
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line,
            col,
        }
    }

    /// Convert to a `std::ops::Range` over the source bytes.
    #[inline]
    pub fn to_range(&self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}@{}:{}", self.start, self.end, self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col + 1)
    }
}

/// Something with a source location.
pub trait Spanned {
    fn span(&self) -> Span;
}

#[cfg(test)]
mod tests;
