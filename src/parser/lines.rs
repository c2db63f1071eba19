//! Byte offset to line number conversion.

use crate::provenance::Range;
use std::sync::Arc;

/// Line start offsets of one source file.
#[derive(Debug, Clone)]
pub struct LineIndex {
    filename: Arc<str>,
    starts: Vec<usize>,
    source_len: usize,
}

impl LineIndex {
    #[must_use]
    pub fn new(filename: impl Into<Arc<str>>, source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            filename: filename.into(),
            starts,
            source_len: source.len(),
        }
    }

    #[must_use]
    pub fn filename(&self) -> &Arc<str> {
        &self.filename
    }

    /// 1-based line containing `offset`.
    #[must_use]
    pub fn line_of(&self, offset: usize) -> usize {
        let offset = offset.min(self.source_len);
        self.starts.partition_point(|&start| start <= offset)
    }

    /// 1-based column of `offset` within its line.
    #[must_use]
    pub fn column_of(&self, offset: usize) -> usize {
        let line = self.line_of(offset);
        offset.min(self.source_len) - self.starts[line - 1] + 1
    }

    /// Range covering `span` once surrounding whitespace is trimmed, so a
    /// value written on one line always maps to a single-line range.
    #[must_use]
    pub fn range(&self, source: &str, span: std::ops::Range<usize>) -> Range {
        let end = span.end.min(source.len());
        let start = span.start.min(end);
        let slice = source.get(start..end).unwrap_or_default();

        let leading = slice.len() - slice.trim_start().len();
        let trimmed_len = slice.trim().len();
        let (first, last) = if trimmed_len == 0 {
            (start, start)
        } else {
            (start + leading, start + leading + trimmed_len - 1)
        };

        Range::new(Arc::clone(&self.filename), self.line_of(first), self.line_of(last))
            .with_columns(self.column_of(first), self.column_of(last) + 1)
    }

    /// Range of a whole 1-based line.
    #[must_use]
    pub fn line_range(&self, line: usize) -> Range {
        Range::new(Arc::clone(&self.filename), line, line)
    }

    /// Range covering the whole file.
    #[must_use]
    pub fn file_range(&self) -> Range {
        Range::new(Arc::clone(&self.filename), 1, self.starts.len().max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "a = 1\n\nblock {\n  b = 2\n}\n";

    #[test]
    fn test_line_of() {
        let index = LineIndex::new("main.tf", SOURCE);
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(4), 1);
        assert_eq!(index.line_of(6), 2);
        assert_eq!(index.line_of(7), 3);
        assert_eq!(index.line_of(SOURCE.len()), 6);
    }

    #[test]
    fn test_range_trims_whitespace() {
        let index = LineIndex::new("main.tf", SOURCE);
        let start = SOURCE.find("  b").unwrap();
        // span includes the trailing newline of line 4
        let range = index.range(SOURCE, start..start + 8);
        assert_eq!(range.start_line(), 4);
        assert_eq!(range.end_line(), 4);
        assert_eq!(range.start_column(), Some(3));
    }

    #[test]
    fn test_multi_line_range() {
        let index = LineIndex::new("main.tf", SOURCE);
        let start = SOURCE.find("block").unwrap();
        let range = index.range(SOURCE, start..SOURCE.len());
        assert_eq!(range.start_line(), 3);
        assert_eq!(range.end_line(), 5);
        assert_eq!(range.filename(), "main.tf");
    }
}
