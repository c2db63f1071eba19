//! Terraform adapters.
//!
//! Every `.tf` module directory is one [`Document`]. Adapters take all
//! modules of a scan at once, and references are resolved within the
//! module that contains them.

pub mod aws;
pub mod openstack;

use crate::document::Document;
use crate::providers::State;

/// Adapt every Terraform module into provider state.
#[must_use]
pub fn adapt(documents: &[Document]) -> State {
    State {
        aws: aws::adapt(documents),
        openstack: openstack::adapt(documents),
    }
}
