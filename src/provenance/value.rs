//! Provenance-tracked scalar values.

use super::{HasMetadata, Metadata, Range};
use serde::{Deserialize, Serialize};

/// A scalar extracted from a document together with where it came from.
///
/// Values are immutable once built. Equality compares the payload and the
/// source range only, so two adaptations of the same document compare equal
/// even though they are distinct allocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Value<T> {
    value: T,
    metadata: Metadata,
}

pub type StringValue = Value<String>;
pub type BoolValue = Value<bool>;
pub type IntValue = Value<i64>;
pub type StringListValue = Value<Vec<String>>;

impl<T> Value<T> {
    /// A value that was present in the source.
    #[must_use]
    pub fn new(value: T, metadata: Metadata) -> Self {
        Self { value, metadata }
    }

    /// A value for an attribute that was not set, located at its parent.
    ///
    /// The payload is the declared default; `is_explicit()` is false so rules
    /// can tell "omitted" from "set to the same value".
    #[must_use]
    pub fn default_from(value: T, parent: &Metadata) -> Self {
        Self {
            value,
            metadata: parent.as_default(),
        }
    }

    #[must_use]
    pub const fn value(&self) -> &T {
        &self.value
    }

    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    #[must_use]
    pub const fn range(&self) -> &Range {
        self.metadata.range()
    }

    #[must_use]
    pub const fn is_explicit(&self) -> bool {
        self.metadata.is_explicit()
    }

    #[must_use]
    pub const fn is_resolvable(&self) -> bool {
        self.metadata.is_resolvable()
    }

    /// Consume the wrapper, keeping only the payload.
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Derive a value of another type, keeping this value's provenance.
    #[must_use]
    pub fn map<U>(&self, f: impl FnOnce(&T) -> U) -> Value<U> {
        Value {
            value: f(&self.value),
            metadata: self.metadata.clone(),
        }
    }
}

impl<T: Default> Value<T> {
    /// A value whose expression could not be evaluated statically.
    ///
    /// Rules should generally not flag unresolvable values.
    #[must_use]
    pub fn unresolvable(metadata: &Metadata) -> Self {
        Self {
            value: T::default(),
            metadata: metadata.as_unresolvable(),
        }
    }
}

impl<T: PartialEq> PartialEq for Value<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.metadata.range() == other.metadata.range()
    }
}

impl<T> HasMetadata for Value<T> {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

impl StringValue {
    /// Empty payload, whether omitted or explicitly `""`. An unresolvable
    /// expression is not empty: something was set, we just cannot read it.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_resolvable() && self.value.is_empty()
    }

    /// Set to a non-empty value in the source.
    #[must_use]
    pub fn is_not_empty(&self) -> bool {
        self.is_resolvable() && !self.value.is_empty()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn equal_to(&self, other: &str) -> bool {
        self.is_resolvable() && self.value == other
    }

    #[must_use]
    pub fn equal_to_ignore_case(&self, other: &str) -> bool {
        self.is_resolvable() && self.value.eq_ignore_ascii_case(other)
    }

    #[must_use]
    pub fn equal_to_any(&self, others: &[&str]) -> bool {
        others.iter().any(|other| self.equal_to(other))
    }

    #[must_use]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.is_resolvable() && self.value.starts_with(prefix)
    }

    #[must_use]
    pub fn ends_with(&self, suffix: &str) -> bool {
        self.is_resolvable() && self.value.ends_with(suffix)
    }

    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.is_resolvable() && self.value.contains(needle)
    }
}

impl BoolValue {
    #[must_use]
    pub fn is_true(&self) -> bool {
        self.is_resolvable() && self.value
    }

    #[must_use]
    pub fn is_false(&self) -> bool {
        self.is_resolvable() && !self.value
    }
}

impl IntValue {
    #[must_use]
    pub fn less_than(&self, bound: i64) -> bool {
        self.is_resolvable() && self.value < bound
    }

    #[must_use]
    pub fn greater_than(&self, bound: i64) -> bool {
        self.is_resolvable() && self.value > bound
    }
}

impl StringListValue {
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.is_resolvable() && self.value.iter().any(|item| item == needle)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_metadata() -> Metadata {
        Metadata::new(Range::new("main.tf", 2, 4), "openstack_compute_instance_v2.web")
    }

    #[test]
    fn test_present_empty_differs_from_absent() {
        let block = block_metadata();
        let present = StringValue::new(String::new(), Metadata::new(Range::new("main.tf", 3, 3), "x.admin_pass"));
        let absent = StringValue::default_from(String::new(), &block);

        assert!(present.is_empty() && absent.is_empty());
        assert!(present.is_explicit());
        assert!(!absent.is_explicit());
        assert_eq!(absent.range(), block.range());
    }

    #[test]
    fn test_equality_ignores_reference_and_flags() {
        let block = block_metadata();
        let a = BoolValue::new(true, block.child("enabled"));
        let b = BoolValue::new(true, block.clone());
        let c = BoolValue::default_from(true, &block);
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_ne!(a, BoolValue::new(false, block));
    }

    #[test]
    fn test_unresolvable_never_matches() {
        let value = StringValue::unresolvable(&block_metadata());
        assert!(!value.is_resolvable());
        assert!(!value.equal_to(""));
        assert!(!value.is_not_empty());
        assert!(!value.is_empty());

        let flag = BoolValue::unresolvable(&block_metadata());
        assert!(!flag.is_true());
        assert!(!flag.is_false());
    }

    #[test]
    fn test_map_keeps_provenance() {
        let direction = StringValue::new("ingress".to_string(), Metadata::new(Range::new("main.tf", 7, 7), "r.direction"));
        let ingress = direction.map(|d| d == "ingress");
        assert!(ingress.is_true());
        assert_eq!(ingress.range().start_line(), 7);

        let unknown = StringValue::unresolvable(&block_metadata()).map(|d| d == "ingress");
        assert!(!unknown.is_true() && !unknown.is_false());
    }

    #[test]
    fn test_comparisons() {
        let block = block_metadata();
        let retention = IntValue::new(1, block.clone());
        assert!(retention.less_than(2));
        assert!(!retention.greater_than(1));

        let tls = StringValue::new("TLS_1_0".to_string(), block.clone());
        assert!(tls.equal_to_any(&["TLS_1_0", "TLS_1_1"]));
        assert!(tls.starts_with("TLS"));
        assert!(tls.equal_to_ignore_case("tls_1_0"));

        let policies = StringListValue::new(vec!["AWSLambdaBasicExecutionRole".to_string()], block);
        assert!(policies.contains("AWSLambdaBasicExecutionRole"));
    }
}
