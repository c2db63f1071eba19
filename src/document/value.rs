//! Attribute payloads.

use serde::Serialize;
use std::fmt;

/// The payload of a generic attribute.
///
/// Front-ends reduce whatever their format can express to these variants.
/// Anything that cannot be evaluated statically is kept as a [`Reference`]
/// (a traversal to another resource) or an [`Expression`] (raw source text).
///
/// [`Reference`]: AttrValue::Reference
/// [`Expression`]: AttrValue::Expression
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttrValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<AttrValue>),
    Map(Vec<(String, AttrValue)>),
    Reference(String),
    Expression(String),
}

impl AttrValue {
    /// Whether the payload is a known literal (recursively).
    #[must_use]
    pub fn is_resolvable(&self) -> bool {
        match self {
            Self::Reference(_) | Self::Expression(_) => false,
            Self::List(items) => items.iter().all(Self::is_resolvable),
            Self::Map(entries) => entries.iter().all(|(_, v)| v.is_resolvable()),
            _ => true,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// String view of scalar literals. Numbers and bools are rendered the
    /// way they would be written in the source.
    #[must_use]
    pub fn as_string(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Number(n) => Some(format_number(*n)),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Booleans, accepting the quoted forms `"true"` and `"false"`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Integers, accepting integral numbers and numeric strings.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) if n.fract() == 0.0 => Some(*n as i64),
            Self::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// A list of strings. A single scalar is treated as a one-element list.
    #[must_use]
    pub fn as_string_list(&self) -> Option<Vec<String>> {
        match self {
            Self::List(items) => items.iter().map(Self::as_string).collect(),
            other => other.as_string().map(|s| vec![s]),
        }
    }

    /// Look up a key of a map payload.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// All reference texts contained in this payload, depth first.
    #[must_use]
    pub fn references(&self) -> Vec<&str> {
        let mut found = Vec::new();
        self.collect_references(&mut found);
        found
    }

    fn collect_references<'a>(&'a self, found: &mut Vec<&'a str>) {
        match self {
            Self::Reference(r) => found.push(r),
            Self::List(items) => items.iter().for_each(|item| item.collect_references(found)),
            Self::Map(entries) => entries.iter().for_each(|(_, v)| v.collect_references(found)),
            _ => {}
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{}", format_number(*n)),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Reference(r) | Self::Expression(r) => write!(f, "{r}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key} = {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(AttrValue::Bool(true), Some(true); "literal true")]
    #[test_case(AttrValue::String("true".into()), Some(true); "quoted true")]
    #[test_case(AttrValue::String("False".into()), Some(false); "quoted false mixed case")]
    #[test_case(AttrValue::String("yes".into()), None; "not a bool")]
    #[test_case(AttrValue::Number(1.0), None; "number is not a bool")]
    fn test_as_bool(value: AttrValue, expected: Option<bool>) {
        assert_eq!(value.as_bool(), expected);
    }

    #[test]
    fn test_numbers_render_without_fraction() {
        assert_eq!(AttrValue::Number(22.0).as_string().as_deref(), Some("22"));
        assert_eq!(AttrValue::Number(1.5).as_string().as_deref(), Some("1.5"));
        assert_eq!(AttrValue::String("7".into()).as_i64(), Some(7));
        assert_eq!(AttrValue::Number(7.5).as_i64(), None);
    }

    #[test]
    fn test_references_are_collected_recursively() {
        let value = AttrValue::List(vec![
            AttrValue::Reference("aws_s3_bucket.a.id".into()),
            AttrValue::Map(vec![("b".into(), AttrValue::Reference("aws_s3_bucket.b.id".into()))]),
            AttrValue::String("literal".into()),
        ]);
        assert_eq!(value.references(), vec!["aws_s3_bucket.a.id", "aws_s3_bucket.b.id"]);
        assert!(!value.is_resolvable());
    }
}
