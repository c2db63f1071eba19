//! CloudFormation and SAM adapters.
//!
//! Each template is one [`Document`] whose `resource` blocks are labelled
//! `[Type, LogicalId]`. Resource settings live in the `Properties` block;
//! when a resource has none, defaults are located at the resource itself.

pub mod aws;

use crate::document::{Block, Document};
use crate::providers::State;

/// Adapt one template into provider state.
#[must_use]
pub fn adapt(document: &Document) -> State {
    State {
        aws: aws::adapt(document),
        ..State::default()
    }
}

/// The `Properties` block of a resource, or the resource itself.
pub(crate) fn properties(resource: &Block) -> &Block {
    resource.get_block("Properties").unwrap_or(resource)
}
