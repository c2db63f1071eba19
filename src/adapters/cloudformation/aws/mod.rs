//! AWS resource types, including the `AWS::Serverless` transform.

pub mod rds;
pub mod s3;
pub mod sam;

use crate::document::Document;
use crate::providers::aws::Aws;

#[must_use]
pub fn adapt(document: &Document) -> Aws {
    Aws {
        rds: rds::adapt(document),
        s3: s3::adapt(document),
        sam: sam::adapt(document),
    }
}
