//! Provenance metadata attached to every extracted value and domain object.

use super::Range;
use serde::{Deserialize, Serialize};

/// Where a value came from and how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    range: Range,
    /// Logical path, e.g. `aws_s3_bucket.logs.acl` or `Resources.Api.Properties.Name`.
    reference: String,
    /// False when the value was synthesized because the attribute was absent.
    explicit: bool,
    /// False for aggregate roots that have no block of their own.
    managed: bool,
    /// False when the source expression could not be evaluated statically.
    resolvable: bool,
}

impl Metadata {
    /// Metadata for a value or block read directly from a document.
    #[must_use]
    pub fn new(range: Range, reference: impl Into<String>) -> Self {
        Self {
            range,
            reference: reference.into(),
            explicit: true,
            managed: true,
            resolvable: true,
        }
    }

    /// Metadata for aggregates that do not correspond to any source block.
    #[must_use]
    pub fn unmanaged() -> Self {
        Self {
            range: Range::default(),
            reference: String::new(),
            explicit: false,
            managed: false,
            resolvable: true,
        }
    }

    /// Copy of this metadata marked as a synthesized default.
    #[must_use]
    pub fn as_default(&self) -> Self {
        Self {
            explicit: false,
            ..self.clone()
        }
    }

    /// Copy of this metadata marked as statically unresolvable.
    #[must_use]
    pub fn as_unresolvable(&self) -> Self {
        Self {
            resolvable: false,
            ..self.clone()
        }
    }

    /// Copy of this metadata pointing at another range.
    #[must_use]
    pub fn with_range(&self, range: Range) -> Self {
        Self {
            range,
            ..self.clone()
        }
    }

    /// Metadata for a child path below this one, sharing the range.
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        let reference = if self.reference.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.reference)
        };
        Self {
            reference,
            ..self.clone()
        }
    }

    #[must_use]
    pub const fn range(&self) -> &Range {
        &self.range
    }

    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }

    #[must_use]
    pub const fn is_explicit(&self) -> bool {
        self.explicit
    }

    #[must_use]
    pub const fn is_managed(&self) -> bool {
        self.managed
    }

    #[must_use]
    pub const fn is_resolvable(&self) -> bool {
        self.resolvable
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::unmanaged()
    }
}

/// Anything that can point a finding at its source.
pub trait HasMetadata {
    fn metadata(&self) -> &Metadata;
}

impl HasMetadata for Metadata {
    fn metadata(&self) -> &Metadata {
        self
    }
}

impl<T: HasMetadata + ?Sized> HasMetadata for &T {
    fn metadata(&self) -> &Metadata {
        (**self).metadata()
    }
}

/// Implements [`HasMetadata`] for structs with a `metadata: Metadata` field.
#[macro_export]
macro_rules! impl_has_metadata {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::provenance::HasMetadata for $ty {
                fn metadata(&self) -> &$crate::provenance::Metadata {
                    &self.metadata
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keeps_range() {
        let block = Metadata::new(Range::new("main.tf", 2, 6), "aws_s3_bucket.logs");
        let default = block.child("acl").as_default();

        assert!(!default.is_explicit());
        assert!(default.is_managed());
        assert_eq!(default.range(), block.range());
        assert_eq!(default.reference(), "aws_s3_bucket.logs.acl");
    }

    #[test]
    fn test_unmanaged_has_unknown_range() {
        let metadata = Metadata::unmanaged();
        assert!(!metadata.is_managed());
        assert!(metadata.range().is_unknown());
        assert_eq!(metadata.child("compute").reference(), "compute");
    }

    #[test]
    fn test_with_range_keeps_flags() {
        let metadata = Metadata::new(Range::new("main.tf", 2, 6), "aws_s3_bucket.logs")
            .as_default()
            .as_unresolvable();
        let moved = metadata.with_range(Range::new("main.tf", 2, 9));

        assert_eq!(moved.range().end_line(), 9);
        assert_eq!(moved.reference(), "aws_s3_bucket.logs");
        assert!(!moved.is_explicit());
        assert!(!moved.is_resolvable());
        assert!(moved.is_managed());
    }
}
