//! Resources of the `AWS::Serverless-2016-10-31` transform.

mod api;
mod application;
mod function;
mod http_api;
mod simple_table;
mod state_machine;

use crate::document::{Block, Document};
use crate::provenance::{HasMetadata, StringValue};
use crate::providers::aws::sam::Sam;

#[must_use]
pub fn adapt(document: &Document) -> Sam {
    Sam {
        apis: api::get_apis(document),
        http_apis: http_api::get_http_apis(document),
        functions: function::get_functions(document),
        state_machines: state_machine::get_state_machines(document),
        simple_tables: simple_table::get_simple_tables(document),
        applications: application::get_applications(document),
    }
}

/// Names of the managed policies in a `Policies` property.
///
/// `Policies` is a single policy name, a list of names, or a list mixing
/// names with inline policy documents and policy templates. Only the names
/// are kept.
fn managed_policies(props: &Block) -> Vec<StringValue> {
    match props.get_attribute("Policies") {
        Some(attribute) => attribute
            .as_string_values()
            .into_iter()
            .filter(|policy| policy.is_resolvable())
            .collect(),
        None => {
            tracing::trace!(resource = %props.metadata().reference(), "No managed policies");
            Vec::new()
        }
    }
}
