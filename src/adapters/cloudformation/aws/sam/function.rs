use super::managed_policies;
use crate::adapters::cloudformation::properties;
use crate::document::Document;
use crate::provenance::HasMetadata;
use crate::providers::aws::sam::Function;

/// Lambda's tracing mode when `Tracing` is not set.
pub(super) const DEFAULT_TRACING: &str = "PassThrough";

pub(super) fn get_functions(document: &Document) -> Vec<Function> {
    document
        .resources_of_type("AWS::Serverless::Function")
        .into_iter()
        .map(|resource| {
            let props = properties(resource);
            Function {
                metadata: resource.metadata().clone(),
                function_name: props.get_string_or_default("FunctionName", ""),
                tracing: props.get_string_or_default("Tracing", DEFAULT_TRACING),
                managed_policies: managed_policies(props),
            }
        })
        .collect()
}
