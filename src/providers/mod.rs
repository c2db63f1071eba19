//! Typed, provider-specific state.
//!
//! Adapters fill a [`State`] once per scan; rules only ever receive `&State`.
//! Every field is either a provenance-tracked value or a nested typed object,
//! so rules can point findings at the exact declaration responsible.

pub mod aws;
pub mod openstack;

use serde::Serialize;

/// Aggregate of every adapted resource, across providers and formats.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct State {
    pub aws: aws::Aws,
    pub openstack: openstack::OpenStack,
}

impl State {
    /// Append the collections of `other`, keeping document order.
    pub fn merge(&mut self, other: Self) {
        self.aws.merge(other.aws);
        self.openstack.merge(other.openstack);
    }

    /// Number of adapted top-level resources.
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.aws.resource_count() + self.openstack.resource_count()
    }
}
