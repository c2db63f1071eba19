//! Amazon Web Services.

pub mod rds;
pub mod s3;
pub mod sam;

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aws {
    pub rds: rds::Rds,
    pub s3: s3::S3,
    pub sam: sam::Sam,
}

impl Aws {
    pub fn merge(&mut self, other: Self) {
        self.rds.merge(other.rds);
        self.s3.buckets.extend(other.s3.buckets);
        self.sam.merge(other.sam);
    }

    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.rds.instances.len()
            + self.rds.classic.db_security_groups.len()
            + self.s3.buckets.len()
            + self.sam.resource_count()
    }
}
