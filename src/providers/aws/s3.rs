//! Simple Storage Service.

use crate::impl_has_metadata;
use crate::provenance::{BoolValue, Metadata, StringValue};
use serde::Serialize;

/// Canned ACLs that expose a bucket beyond its owner.
pub const PUBLIC_ACLS: &[&str] = &["public-read", "public-read-write", "website", "authenticated-read"];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct S3 {
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub metadata: Metadata,
    pub name: StringValue,
    /// Absent when no public access block targets this bucket
    pub public_access_block: Option<PublicAccessBlock>,
    pub encryption: Encryption,
    pub versioning: Versioning,
    pub logging: Logging,
    /// Canned ACL in Terraform spelling (`public-read`, `private`...)
    pub acl: StringValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicAccessBlock {
    pub metadata: Metadata,
    pub block_public_acls: BoolValue,
    pub block_public_policy: BoolValue,
    pub ignore_public_acls: BoolValue,
    pub restrict_public_buckets: BoolValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Encryption {
    pub metadata: Metadata,
    pub enabled: BoolValue,
    pub algorithm: StringValue,
    pub kms_key_id: StringValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Versioning {
    pub metadata: Metadata,
    pub enabled: BoolValue,
    pub mfa_delete: BoolValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Logging {
    pub metadata: Metadata,
    pub enabled: BoolValue,
    pub target_bucket: StringValue,
}

impl_has_metadata!(Bucket, PublicAccessBlock, Encryption, Versioning, Logging);
