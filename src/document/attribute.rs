//! Named attributes.

use super::AttrValue;
use crate::provenance::{
    BoolValue, HasMetadata, IntValue, Metadata, Range, StringListValue, StringValue, Value,
};
use serde::Serialize;

/// A named value inside a block, with the range of its declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    name: String,
    value: AttrValue,
    metadata: Metadata,
}

impl Attribute {
    #[must_use]
    pub fn new(name: impl Into<String>, value: AttrValue, metadata: Metadata) -> Self {
        Self {
            name: name.into(),
            value,
            metadata,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn value(&self) -> &AttrValue {
        &self.value
    }

    #[must_use]
    pub const fn range(&self) -> &Range {
        self.metadata.range()
    }

    #[must_use]
    pub fn is_resolvable(&self) -> bool {
        self.value.is_resolvable()
    }

    /// Reference texts held by this attribute (`aws_s3_bucket.logs.id`, `MyBucket`).
    #[must_use]
    pub fn references(&self) -> Vec<&str> {
        self.value.references()
    }

    /// The payload as a string value. Null yields an explicit empty string.
    #[must_use]
    pub fn as_string_value(&self) -> StringValue {
        match &self.value {
            AttrValue::Null => Value::new(String::new(), self.metadata.clone()),
            other => other.as_string().map_or_else(
                || Value::unresolvable(&self.metadata),
                |s| Value::new(s, self.metadata.clone()),
            ),
        }
    }

    /// The payload as a boolean; null falls back to `default` at this range.
    #[must_use]
    pub fn as_bool_value(&self, default: bool) -> BoolValue {
        if self.value.is_null() {
            return Value::new(default, self.metadata.clone());
        }
        self.value.as_bool().map_or_else(
            || Value::unresolvable(&self.metadata),
            |b| Value::new(b, self.metadata.clone()),
        )
    }

    /// The payload as an integer; null falls back to `default` at this range.
    #[must_use]
    pub fn as_int_value(&self, default: i64) -> IntValue {
        if self.value.is_null() {
            return Value::new(default, self.metadata.clone());
        }
        self.value.as_i64().map_or_else(
            || Value::unresolvable(&self.metadata),
            |n| Value::new(n, self.metadata.clone()),
        )
    }

    /// The payload as a list of strings.
    #[must_use]
    pub fn as_string_list_value(&self) -> StringListValue {
        if self.value.is_null() {
            return Value::new(Vec::new(), self.metadata.clone());
        }
        self.value.as_string_list().map_or_else(
            || Value::unresolvable(&self.metadata),
            |items| Value::new(items, self.metadata.clone()),
        )
    }

    /// One string value per list element, each located at this attribute.
    #[must_use]
    pub fn as_string_values(&self) -> Vec<StringValue> {
        match &self.value {
            AttrValue::List(items) => items
                .iter()
                .map(|item| {
                    item.as_string().map_or_else(
                        || Value::unresolvable(&self.metadata),
                        |s| Value::new(s, self.metadata.clone()),
                    )
                })
                .collect(),
            AttrValue::Null => Vec::new(),
            _ => vec![self.as_string_value()],
        }
    }
}

impl HasMetadata for Attribute {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}
