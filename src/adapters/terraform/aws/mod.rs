//! AWS resources declared with the `hashicorp/aws` provider.

pub mod rds;
pub mod s3;

use crate::document::Document;
use crate::providers::aws::Aws;

#[must_use]
pub fn adapt(documents: &[Document]) -> Aws {
    Aws {
        rds: rds::adapt(documents),
        s3: s3::adapt(documents),
        ..Aws::default()
    }
}
