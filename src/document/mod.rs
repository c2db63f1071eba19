//! Generic document tree.
//!
//! Front-ends turn Terraform modules and CloudFormation templates into a
//! [`Document`]: an ordered list of [`Block`]s whose children are either
//! nested blocks or named [`Attribute`]s. Every node carries the range it was
//! declared at. Adapters only talk to this interface, never to a parser's own
//! types, so one query API serves every provider.
//!
//! # Shape per format
//!
//! ```text
//! Terraform                          CloudFormation
//! resource "aws_s3_bucket" "logs" {  Logs:
//!   acl = "private"                    Type: AWS::S3::Bucket
//!   versioning {                       Properties:
//!     enabled = true                     AccessControl: Private
//!   }                                    VersioningConfiguration:
//! }                                        Status: Enabled
//!
//! Block(kind="resource", labels=[aws_s3_bucket, logs])
//!                                    Block(kind="resource", labels=[AWS::S3::Bucket, Logs])
//! ```
//!
//! Lookups never fail: a missing child is simply `None`, and the
//! `get_*_or_default` helpers turn that into a default value located at the
//! parent block.

mod attribute;
mod block;
mod value;

pub use attribute::Attribute;
pub use block::{Block, Child};
pub use value::AttrValue;

use crate::types::SourceFormat;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Block kind used for top-level resources in every format.
pub const RESOURCE: &str = "resource";

/// One parsed unit: a Terraform module directory or a CloudFormation template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    format: SourceFormat,
    path: PathBuf,
    blocks: Vec<Block>,
}

impl Document {
    #[must_use]
    pub fn new(format: SourceFormat, path: impl Into<PathBuf>, blocks: Vec<Block>) -> Self {
        Self {
            format,
            path: path.into(),
            blocks,
        }
    }

    #[must_use]
    pub const fn format(&self) -> SourceFormat {
        self.format
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Top-level blocks in source order (file order, then declaration order).
    #[must_use]
    pub fn get_blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Top-level blocks of one kind (`resource`, `variable`, `data`...).
    pub fn blocks_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Block> + 'a {
        self.blocks.iter().filter(move |block| block.kind() == kind)
    }

    /// Resources whose type label matches, in source order.
    ///
    /// The type is the Terraform resource type (`aws_s3_bucket`) or the
    /// CloudFormation `Type` string (`AWS::S3::Bucket`).
    #[must_use]
    pub fn resources_of_type(&self, resource_type: &str) -> Vec<&Block> {
        self.blocks_of_kind(RESOURCE)
            .filter(|block| block.type_label() == resource_type)
            .collect()
    }

    #[must_use]
    pub fn find_resource(&self, resource_type: &str, name: &str) -> Option<&Block> {
        self.blocks_of_kind(RESOURCE)
            .find(|block| block.type_label() == resource_type && block.name_label() == name)
    }

    /// Find a resource of `resource_type` whose `attribute` holds the literal `value`.
    #[must_use]
    pub fn find_resource_by_attribute(&self, resource_type: &str, attribute: &str, value: &str) -> Option<&Block> {
        self.resources_of_type(resource_type).into_iter().find(|block| {
            block
                .get_attribute(attribute)
                .and_then(|attr| attr.value().as_str())
                .is_some_and(|v| v == value)
        })
    }

    /// Resolve the references held by `attribute` to a resource of `target_type`.
    ///
    /// Dangling references resolve to `None`; callers fall back to defaults.
    #[must_use]
    pub fn resolve_reference(&self, attribute: &Attribute, target_type: &str) -> Option<&Block> {
        let candidates = self.resources_of_type(target_type);
        attribute.references().into_iter().find_map(|reference| {
            candidates
                .iter()
                .copied()
                .find(|candidate| block::reference_matches(reference, candidate))
        })
    }

    /// Resources of `source_type` whose `attribute` points at `target`.
    #[must_use]
    pub fn referencing_blocks(&self, target: &Block, source_type: &str, attribute: &str) -> Vec<&Block> {
        self.resources_of_type(source_type)
            .into_iter()
            .filter(|block| {
                block.get_attribute(attribute).is_some_and(|attr| {
                    attr.references()
                        .into_iter()
                        .any(|reference| block::reference_matches(reference, target))
                })
            })
            .collect()
    }
}
