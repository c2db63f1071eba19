//! Generic blocks and the schema-agnostic query interface.

use super::Attribute;
use crate::provenance::{
    BoolValue, HasMetadata, IntValue, Metadata, Range, StringListValue, StringValue, Value,
};
use serde::Serialize;

/// A child of a block, in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Child {
    Attribute(Attribute),
    Block(Block),
}

impl Child {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Attribute(attribute) => attribute.name(),
            Self::Block(block) => block.kind(),
        }
    }

    #[must_use]
    pub fn range(&self) -> &Range {
        match self {
            Self::Attribute(attribute) => attribute.range(),
            Self::Block(block) => block.range(),
        }
    }
}

/// A block: a kind (`resource`, `versioning`, `Properties` entry...), its
/// labels, and ordered children.
///
/// Blocks are assembled once by a front-end and never mutated afterwards;
/// the type only exposes read accessors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    kind: String,
    labels: Vec<String>,
    children: Vec<Child>,
    metadata: Metadata,
}

impl Block {
    /// Assemble a block. The block's range is widened to span every child
    /// declared in the same file.
    #[must_use]
    pub fn new(kind: impl Into<String>, labels: Vec<String>, children: Vec<Child>, metadata: Metadata) -> Self {
        let range = children
            .iter()
            .map(Child::range)
            .filter(|range| range.filename() == metadata.range().filename())
            .fold(metadata.range().clone(), |acc, range| acc.union(range));
        let metadata = if &range == metadata.range() {
            metadata
        } else {
            metadata.with_range(range)
        };
        Self {
            kind: kind.into(),
            labels,
            children,
            metadata,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// First label: the resource type for `resource "aws_s3_bucket" "logs"`.
    #[must_use]
    pub fn type_label(&self) -> &str {
        self.labels.first().map_or("", String::as_str)
    }

    /// Last label: the resource name for `resource "aws_s3_bucket" "logs"`.
    #[must_use]
    pub fn name_label(&self) -> &str {
        self.labels.last().map_or("", String::as_str)
    }

    /// `type.name` for two-label blocks, the single label otherwise.
    #[must_use]
    pub fn full_name(&self) -> String {
        self.labels.join(".")
    }

    #[must_use]
    pub fn children(&self) -> &[Child] {
        &self.children
    }

    #[must_use]
    pub const fn range(&self) -> &Range {
        self.metadata.range()
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.children.iter().filter_map(|child| match child {
            Child::Attribute(attribute) => Some(attribute),
            Child::Block(_) => None,
        })
    }

    /// True if an attribute or nested block with this exact name exists.
    #[must_use]
    pub fn has_child(&self, name: &str) -> bool {
        self.children.iter().any(|child| child.name() == name)
    }

    /// Negation of [`has_child`](Self::has_child).
    #[must_use]
    pub fn missing_child(&self, name: &str) -> bool {
        !self.has_child(name)
    }

    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes().find(|attribute| attribute.name() == name)
    }

    /// Follow a dotted path through nested blocks to an attribute.
    ///
    /// `get_nested_attribute("VersioningConfiguration.Status")`
    #[must_use]
    pub fn get_nested_attribute(&self, path: &str) -> Option<&Attribute> {
        match path.split_once('.') {
            Some((head, rest)) => self.get_block(head)?.get_nested_attribute(rest),
            None => self.get_attribute(path),
        }
    }

    /// First nested block of the given kind.
    #[must_use]
    pub fn get_block(&self, kind: &str) -> Option<&Block> {
        self.blocks().find(|block| block.kind() == kind)
    }

    /// Follow a dotted path through nested blocks.
    #[must_use]
    pub fn get_nested_block(&self, path: &str) -> Option<&Block> {
        path.split('.').try_fold(self, |block, kind| block.get_block(kind))
    }

    /// Nested blocks in source order, optionally restricted to one kind.
    #[must_use]
    pub fn get_blocks(&self, kind: Option<&str>) -> Vec<&Block> {
        self.blocks()
            .filter(|block| kind.map_or(true, |k| block.kind() == k))
            .collect()
    }

    fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.children.iter().filter_map(|child| match child {
            Child::Block(block) => Some(block),
            Child::Attribute(_) => None,
        })
    }

    fn missing(&self, name: &str) -> Metadata {
        self.metadata.child(name)
    }

    /// String attribute, or `default` located at this block when absent.
    #[must_use]
    pub fn get_string_or_default(&self, name: &str, default: &str) -> StringValue {
        self.get_attribute(name).map_or_else(
            || Value::default_from(default.to_string(), &self.missing(name)),
            Attribute::as_string_value,
        )
    }

    /// Boolean attribute, or `default` located at this block when absent.
    #[must_use]
    pub fn get_bool_or_default(&self, name: &str, default: bool) -> BoolValue {
        self.get_attribute(name).map_or_else(
            || Value::default_from(default, &self.missing(name)),
            |attribute| attribute.as_bool_value(default),
        )
    }

    /// Integer attribute, or `default` located at this block when absent.
    #[must_use]
    pub fn get_int_or_default(&self, name: &str, default: i64) -> IntValue {
        self.get_attribute(name).map_or_else(
            || Value::default_from(default, &self.missing(name)),
            |attribute| attribute.as_int_value(default),
        )
    }

    /// List attribute, or an empty list located at this block when absent.
    #[must_use]
    pub fn get_string_list_or_default(&self, name: &str) -> StringListValue {
        self.get_attribute(name).map_or_else(
            || Value::default_from(Vec::new(), &self.missing(name)),
            Attribute::as_string_list_value,
        )
    }

    /// Whether any attribute of this block references `target`.
    #[must_use]
    pub fn references_block(&self, target: &Self) -> bool {
        self.attributes()
            .flat_map(Attribute::references)
            .any(|reference| reference_matches(reference, target))
    }
}

impl HasMetadata for Block {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// Does the reference text point at `target`?
///
/// Accepts Terraform traversals (`aws_s3_bucket.logs.id`,
/// `aws_s3_bucket.logs[0].arn`) and CloudFormation logical ids (`Logs`,
/// `Logs.Arn`).
pub(crate) fn reference_matches(reference: &str, target: &Block) -> bool {
    let cleaned = strip_indexes(reference);
    let mut parts = cleaned.split('.');
    let Some(first) = parts.next() else {
        return false;
    };
    let second = parts.next();

    if target.labels().len() >= 2 {
        // Terraform resource `type.name` or CloudFormation resource `[Type, LogicalId]`
        (first == target.type_label() && second == Some(target.name_label()))
            || first == target.name_label()
    } else {
        first == target.name_label()
    }
}

fn strip_indexes(reference: &str) -> String {
    let mut out = String::with_capacity(reference.len());
    let mut depth = 0usize;
    for c in reference.trim().chars() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}
