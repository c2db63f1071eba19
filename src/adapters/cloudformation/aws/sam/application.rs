use crate::adapters::cloudformation::properties;
use crate::document::{Attribute, Block, Document};
use crate::provenance::{HasMetadata, Metadata, Value};
use crate::providers::aws::sam::{Application, Location};

/// Applications in template order.
///
/// `Location` is either a template path/URL, kept in `location_path`, or
/// an `ApplicationId`/`SemanticVersion` mapping naming a Serverless
/// Application Repository entry, kept in `location`.
pub(super) fn get_applications(document: &Document) -> Vec<Application> {
    document
        .resources_of_type("AWS::Serverless::Application")
        .into_iter()
        .map(|resource| {
            let props = properties(resource);
            let missing = props.metadata().child("Location");
            Application {
                metadata: resource.metadata().clone(),
                location_path: props
                    .get_attribute("Location")
                    .map_or_else(|| Value::default_from(String::new(), &missing), Attribute::as_string_value),
                location: props
                    .get_block("Location")
                    .map_or_else(|| default_location(resource, &missing), repository_location),
            }
        })
        .collect()
}

fn repository_location(location: &Block) -> Location {
    Location {
        metadata: location.metadata().clone(),
        application_id: location.get_string_or_default("ApplicationId", ""),
        semantic_version: location.get_string_or_default("SemanticVersion", ""),
    }
}

fn default_location(resource: &Block, missing: &Metadata) -> Location {
    Location {
        metadata: resource.metadata().clone(),
        application_id: Value::default_from(String::new(), missing),
        semantic_version: Value::default_from(String::new(), missing),
    }
}
