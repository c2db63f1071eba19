//! Source ranges.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A span of lines (and optionally columns) inside one source file.
///
/// Lines are 1-based and inclusive. A range with `start_line == 0` is the
/// "unknown" range used only by aggregate roots that never came from a
/// document; every value extracted from a document has a real range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Range {
    filename: Arc<str>,
    start_line: usize,
    end_line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_column: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_column: Option<usize>,
}

impl Range {
    /// Create a line range.
    #[must_use]
    pub fn new(filename: impl Into<Arc<str>>, start_line: usize, end_line: usize) -> Self {
        Self {
            filename: filename.into(),
            start_line,
            end_line: end_line.max(start_line),
            start_column: None,
            end_column: None,
        }
    }

    /// Attach column information.
    #[must_use]
    pub fn with_columns(mut self, start_column: usize, end_column: usize) -> Self {
        self.start_column = Some(start_column);
        self.end_column = Some(end_column);
        self
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Shared handle to the filename, cheap to clone into child ranges.
    #[must_use]
    pub fn shared_filename(&self) -> Arc<str> {
        Arc::clone(&self.filename)
    }

    #[must_use]
    pub const fn start_line(&self) -> usize {
        self.start_line
    }

    #[must_use]
    pub const fn end_line(&self) -> usize {
        self.end_line
    }

    #[must_use]
    pub const fn start_column(&self) -> Option<usize> {
        self.start_column
    }

    #[must_use]
    pub const fn end_column(&self) -> Option<usize> {
        self.end_column
    }

    /// True for the placeholder range of values with no source.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.start_line == 0
    }

    /// Whether `other` lies entirely within this range (same file).
    #[must_use]
    pub fn covers(&self, other: &Self) -> bool {
        self.filename == other.filename
            && self.start_line <= other.start_line
            && self.end_line >= other.end_line
    }

    /// Smallest range spanning both; the filename of `self` wins.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if self.is_unknown() {
            return other.clone();
        }
        if other.is_unknown() {
            return self.clone();
        }
        Self::new(
            self.shared_filename(),
            self.start_line.min(other.start_line),
            self.end_line.max(other.end_line),
        )
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start_line == self.end_line {
            write!(f, "{}:{}", self.filename, self.start_line)
        } else {
            write!(f, "{}:{}-{}", self.filename, self.start_line, self.end_line)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_single_and_multi_line() {
        assert_eq!(Range::new("main.tf", 3, 3).to_string(), "main.tf:3");
        assert_eq!(Range::new("main.tf", 2, 4).to_string(), "main.tf:2-4");
    }

    #[test]
    fn test_end_never_before_start() {
        let range = Range::new("main.tf", 5, 2);
        assert_eq!(range.end_line(), 5);
    }

    #[test]
    fn test_covers_and_union() {
        let block = Range::new("main.tf", 2, 10);
        let attr = Range::new("main.tf", 4, 4);
        assert!(block.covers(&attr));
        assert!(!attr.covers(&block));
        assert!(!Range::new("other.tf", 2, 10).covers(&attr));

        let merged = attr.union(&Range::new("main.tf", 12, 13));
        assert_eq!((merged.start_line(), merged.end_line()), (4, 13));
        assert_eq!(Range::default().union(&attr), attr);
    }
}
