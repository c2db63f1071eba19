//! Relational Database Service.

use crate::impl_has_metadata;
use crate::provenance::{BoolValue, IntValue, Metadata, StringValue};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rds {
    pub instances: Vec<Instance>,
    pub classic: Classic,
}

impl Rds {
    pub fn merge(&mut self, other: Self) {
        self.instances.extend(other.instances);
        self.classic
            .db_security_groups
            .extend(other.classic.db_security_groups);
    }
}

/// Resources of the EC2-Classic platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classic {
    pub db_security_groups: Vec<DbSecurityGroup>,
}

/// `aws_db_security_group` / `AWS::RDS::DBSecurityGroup`. Its presence alone
/// is the finding, so only its location is kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DbSecurityGroup {
    pub metadata: Metadata,
}

/// A database instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instance {
    pub metadata: Metadata,
    pub backup_retention_period_days: IntValue,
    /// Read replicas inherit backup and encryption settings from the source
    pub replication_source_arn: StringValue,
    pub publicly_accessible: BoolValue,
    pub encryption: Encryption,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Encryption {
    pub metadata: Metadata,
    pub encrypt_storage: BoolValue,
    pub kms_key_id: StringValue,
}

impl_has_metadata!(DbSecurityGroup, Instance, Encryption);
