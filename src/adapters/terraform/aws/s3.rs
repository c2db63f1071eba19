//! S3 buckets and the split `aws_s3_bucket_*` resources that configure
//! them.
//!
//! Since version 4 of the AWS provider, most bucket settings live in
//! separate resources pointing at the bucket through their `bucket`
//! attribute. Those are resolved by reference first, then by literal bucket
//! name, and folded into the bucket they target. Settings for a bucket
//! outside the module are dropped.

use crate::document::{Block, Document};
use crate::provenance::{BoolValue, HasMetadata, Metadata, Value};
use crate::providers::aws::s3::{Bucket, Encryption, Logging, PublicAccessBlock, Versioning, S3};

const BUCKET: &str = "aws_s3_bucket";

#[must_use]
pub fn adapt(documents: &[Document]) -> S3 {
    S3 {
        buckets: documents.iter().flat_map(adapt_document).collect(),
    }
}

fn adapt_document(document: &Document) -> Vec<Bucket> {
    let blocks = document.resources_of_type(BUCKET);
    let mut buckets: Vec<Bucket> = blocks.iter().map(|block| adapt_bucket(block)).collect();

    let mut apply = |resource_type: &str, update: &dyn Fn(&mut Bucket, &Block)| {
        for resource in document.resources_of_type(resource_type) {
            let Some(index) = target_bucket(document, resource)
                .and_then(|target| blocks.iter().position(|block| std::ptr::eq(*block, target)))
            else {
                tracing::debug!(
                    resource = %resource.metadata().reference(),
                    "Bucket reference could not be resolved"
                );
                continue;
            };
            update(&mut buckets[index], resource);
        }
    };

    apply("aws_s3_bucket_acl", &|bucket, block| {
        if block.has_child("acl") {
            bucket.acl = block.get_string_or_default("acl", "private");
        }
    });
    apply("aws_s3_bucket_versioning", &|bucket, block| {
        bucket.versioning = split_versioning(block);
    });
    apply("aws_s3_bucket_logging", &|bucket, block| {
        bucket.logging = Logging {
            metadata: block.metadata().clone(),
            enabled: BoolValue::new(true, block.metadata().clone()),
            target_bucket: block.get_string_or_default("target_bucket", ""),
        };
    });
    apply("aws_s3_bucket_server_side_encryption_configuration", &|bucket, block| {
        bucket.encryption = encryption(block, block.metadata());
    });
    apply("aws_s3_bucket_public_access_block", &|bucket, block| {
        bucket.public_access_block = Some(public_access_block(block));
    });

    buckets
}

/// The bucket a split resource configures.
fn target_bucket<'a>(document: &'a Document, resource: &Block) -> Option<&'a Block> {
    let attribute = resource.get_attribute("bucket")?;
    document.resolve_reference(attribute, BUCKET).or_else(|| {
        attribute
            .value()
            .as_str()
            .and_then(|name| document.find_resource_by_attribute(BUCKET, "bucket", name))
    })
}

fn adapt_bucket(block: &Block) -> Bucket {
    let metadata = block.metadata();

    let versioning = block.get_block("versioning").map_or_else(
        || Versioning {
            metadata: metadata.clone(),
            enabled: Value::default_from(false, &metadata.child("versioning")),
            mfa_delete: Value::default_from(false, &metadata.child("versioning")),
        },
        |versioning| Versioning {
            metadata: versioning.metadata().clone(),
            enabled: versioning.get_bool_or_default("enabled", false),
            mfa_delete: versioning.get_bool_or_default("mfa_delete", false),
        },
    );

    let logging = block.get_block("logging").map_or_else(
        || Logging {
            metadata: metadata.clone(),
            enabled: Value::default_from(false, &metadata.child("logging")),
            target_bucket: Value::default_from(String::new(), &metadata.child("logging")),
        },
        |logging| Logging {
            metadata: logging.metadata().clone(),
            enabled: BoolValue::new(true, logging.metadata().clone()),
            target_bucket: logging.get_string_or_default("target_bucket", ""),
        },
    );

    let encryption = block
        .get_block("server_side_encryption_configuration")
        .map_or_else(|| encryption_default(metadata), |sse| encryption(sse, sse.metadata()));

    Bucket {
        metadata: metadata.clone(),
        name: block.get_string_or_default("bucket", ""),
        public_access_block: None,
        encryption,
        versioning,
        logging,
        acl: block.get_string_or_default("acl", "private"),
    }
}

/// Encryption from a block holding `rule.apply_server_side_encryption_by_default`.
fn encryption(block: &Block, metadata: &Metadata) -> Encryption {
    let Some(default) = block.get_nested_block("rule.apply_server_side_encryption_by_default") else {
        return encryption_default(metadata);
    };
    let algorithm = default.get_string_or_default("sse_algorithm", "");
    Encryption {
        metadata: metadata.clone(),
        enabled: algorithm.map(|a| !a.is_empty()),
        algorithm,
        kms_key_id: default.get_string_or_default("kms_master_key_id", ""),
    }
}

fn encryption_default(parent: &Metadata) -> Encryption {
    let metadata = parent.child("server_side_encryption_configuration");
    Encryption {
        metadata: parent.clone(),
        enabled: Value::default_from(false, &metadata),
        algorithm: Value::default_from(String::new(), &metadata),
        kms_key_id: Value::default_from(String::new(), &metadata),
    }
}

/// `aws_s3_bucket_versioning` spells its flags as `Enabled`/`Disabled`.
fn split_versioning(block: &Block) -> Versioning {
    let Some(configuration) = block.get_block("versioning_configuration") else {
        return Versioning {
            metadata: block.metadata().clone(),
            enabled: Value::default_from(false, &block.metadata().child("versioning_configuration")),
            mfa_delete: Value::default_from(false, &block.metadata().child("versioning_configuration")),
        };
    };
    Versioning {
        metadata: block.metadata().clone(),
        enabled: configuration
            .get_string_or_default("status", "Disabled")
            .map(|status| status.eq_ignore_ascii_case("Enabled")),
        mfa_delete: configuration
            .get_string_or_default("mfa_delete", "Disabled")
            .map(|status| status.eq_ignore_ascii_case("Enabled")),
    }
}

fn public_access_block(block: &Block) -> PublicAccessBlock {
    PublicAccessBlock {
        metadata: block.metadata().clone(),
        block_public_acls: block.get_bool_or_default("block_public_acls", false),
        block_public_policy: block.get_bool_or_default("block_public_policy", false),
        ignore_public_acls: block.get_bool_or_default("ignore_public_acls", false),
        restrict_public_buckets: block.get_bool_or_default("restrict_public_buckets", false),
    }
}
