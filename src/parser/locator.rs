//! Line locations for YAML and JSON templates.
//!
//! `serde_yaml` does not report positions for the values it produces, so
//! templates are scanned a second time, line by line, tracking indentation
//! to find where each key path starts and ends. Lookups fall back to the
//! closest located ancestor.

use crate::parser::lines::LineIndex;
use crate::provenance::Range;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// A mapping key: quoted, or plain up to the first `: `.
static KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:"([^"]+)"|'([^']+)'|([^\s:#'"\-\[\{][^:#]*?))\s*:(?:\s|$)"#).expect("Invalid regex")
});

struct Open {
    indent: usize,
    path: String,
    start: usize,
    list_item: bool,
}

/// Start and end lines of every key path in a template.
#[derive(Debug, Clone)]
pub struct Locator {
    lines: LineIndex,
    spans: HashMap<String, (usize, usize)>,
}

impl Locator {
    #[must_use]
    pub fn new(lines: LineIndex, source: &str) -> Self {
        let mut spans = HashMap::new();
        let mut stack: Vec<Open> = Vec::new();
        let mut list_counters: HashMap<String, usize> = HashMap::new();
        let mut last_content_line = 0;

        let mut close = |stack: &mut Vec<Open>, keep: &dyn Fn(&Open) -> bool, end: usize| {
            while let Some(top) = stack.last() {
                if keep(top) {
                    break;
                }
                if let Some(open) = stack.pop() {
                    spans.entry(open.path).or_insert((open.start, end.max(open.start)));
                }
            }
        };

        for (number, raw) in source.lines().enumerate() {
            let line = number + 1;
            let trimmed = raw.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed == "---" {
                continue;
            }
            let mut indent = raw.len() - trimmed.len();
            let mut content = trimmed;

            if let Some(rest) = content.strip_prefix("- ").or_else(|| (content == "-").then_some("")) {
                close(&mut stack, &|open: &Open| open.indent < indent || (open.indent == indent && !open.list_item), last_content_line);
                let parent = stack.last().map_or_else(String::new, |open| open.path.clone());
                let counter = list_counters.entry(parent.clone()).or_insert(0);
                let path = join(&parent, &counter.to_string());
                *counter += 1;
                stack.push(Open {
                    indent,
                    path,
                    start: line,
                    list_item: true,
                });
                let skipped = content.len() - rest.len();
                indent += skipped + (rest.len() - rest.trim_start().len());
                content = rest.trim_start();
            }

            if let Some(key) = KEY_PATTERN.captures(content).and_then(|caps| {
                caps.get(1)
                    .or_else(|| caps.get(2))
                    .or_else(|| caps.get(3))
                    .map(|m| m.as_str().trim().to_string())
            }) {
                close(&mut stack, &|open: &Open| open.indent < indent, last_content_line);
                let parent = stack.last().map_or_else(String::new, |open| open.path.clone());
                let path = join(&parent, &key);
                list_counters.remove(&path);
                stack.push(Open {
                    indent,
                    path,
                    start: line,
                    list_item: false,
                });
            }

            last_content_line = line;
        }
        close(&mut stack, &|_: &Open| false, last_content_line);

        Self { lines, spans }
    }

    /// Range of `path`, or of its closest located ancestor.
    #[must_use]
    pub fn range(&self, path: &[&str]) -> Range {
        (1..=path.len())
            .rev()
            .find_map(|len| self.exact(&path[..len]))
            .unwrap_or_else(|| self.lines.file_range())
    }

    /// Range of `path` only if that exact path was located.
    #[must_use]
    pub fn exact(&self, path: &[&str]) -> Option<Range> {
        self.spans.get(&path.join("/")).map(|&(start, end)| {
            Range::new(self.lines.filename().clone(), start, end)
        })
    }
}

fn join(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{parent}/{segment}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r#"AWSTemplateFormatVersion: "2010-09-09"
Resources:
  Bucket:
    Type: AWS::S3::Bucket
    Properties:
      BucketName: logs
      BucketEncryption:
        ServerSideEncryptionConfiguration:
          - ServerSideEncryptionByDefault:
              SSEAlgorithm: aws:kms
          - BucketKeyEnabled: true
      Tags:
      - Key: env
        Value: prod
"#;

    fn locator() -> Locator {
        Locator::new(LineIndex::new("template.yaml", TEMPLATE), TEMPLATE)
    }

    #[test]
    fn test_keys_are_located() {
        let locator = locator();
        let bucket = locator.exact(&["Resources", "Bucket"]).unwrap();
        assert_eq!((bucket.start_line(), bucket.end_line()), (3, 14));

        let name = locator.exact(&["Resources", "Bucket", "Properties", "BucketName"]).unwrap();
        assert_eq!((name.start_line(), name.end_line()), (6, 6));
    }

    #[test]
    fn test_list_items_are_indexed() {
        let locator = locator();
        let path = ["Resources", "Bucket", "Properties", "BucketEncryption", "ServerSideEncryptionConfiguration"];
        let under = |rest: &[&'static str]| path.iter().chain(rest).copied().collect::<Vec<_>>();
        let first = locator.exact(&under(&["0"])).unwrap();
        assert_eq!((first.start_line(), first.end_line()), (9, 10));
        let algorithm = locator
            .exact(&under(&["0", "ServerSideEncryptionByDefault", "SSEAlgorithm"]))
            .unwrap();
        assert_eq!(algorithm.start_line(), 10);
        let second = locator.exact(&under(&["1", "BucketKeyEnabled"])).unwrap();
        assert_eq!(second.start_line(), 11);

        let tag_value = locator.exact(&["Resources", "Bucket", "Properties", "Tags", "0", "Value"]).unwrap();
        assert_eq!(tag_value.start_line(), 14);
    }

    #[test]
    fn test_missing_path_falls_back_to_parent() {
        let locator = locator();
        let range = locator.range(&["Resources", "Bucket", "Properties", "VersioningConfiguration", "Status"]);
        assert_eq!(range.start_line(), 5);
    }
}
