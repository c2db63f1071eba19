use super::super::properties;
use crate::document::{Block, Document};
use crate::provenance::{BoolValue, HasMetadata, Value};
use crate::providers::aws::s3::{Bucket, Encryption, Logging, PublicAccessBlock, Versioning, S3};

#[must_use]
pub fn adapt(document: &Document) -> S3 {
    S3 {
        buckets: document
            .resources_of_type("AWS::S3::Bucket")
            .into_iter()
            .map(adapt_bucket)
            .collect(),
    }
}

fn adapt_bucket(resource: &Block) -> Bucket {
    let props = properties(resource);
    let metadata = resource.metadata();

    let versioning = props.get_block("VersioningConfiguration").map_or_else(
        || Versioning {
            metadata: metadata.clone(),
            enabled: Value::default_from(false, &props.metadata().child("VersioningConfiguration")),
            mfa_delete: Value::default_from(false, &props.metadata().child("VersioningConfiguration")),
        },
        |configuration| Versioning {
            metadata: configuration.metadata().clone(),
            enabled: configuration
                .get_string_or_default("Status", "Suspended")
                .map(|status| status == "Enabled"),
            mfa_delete: Value::default_from(false, &configuration.metadata().child("MfaDelete")),
        },
    );

    let logging = props.get_block("LoggingConfiguration").map_or_else(
        || Logging {
            metadata: metadata.clone(),
            enabled: Value::default_from(false, &props.metadata().child("LoggingConfiguration")),
            target_bucket: Value::default_from(String::new(), &props.metadata().child("LoggingConfiguration")),
        },
        |configuration| Logging {
            metadata: configuration.metadata().clone(),
            enabled: BoolValue::new(true, configuration.metadata().clone()),
            target_bucket: configuration.get_string_or_default("DestinationBucketName", ""),
        },
    );

    Bucket {
        metadata: metadata.clone(),
        name: props.get_string_or_default("BucketName", ""),
        public_access_block: props.get_block("PublicAccessBlockConfiguration").map(|block| PublicAccessBlock {
            metadata: block.metadata().clone(),
            block_public_acls: block.get_bool_or_default("BlockPublicAcls", false),
            block_public_policy: block.get_bool_or_default("BlockPublicPolicy", false),
            ignore_public_acls: block.get_bool_or_default("IgnorePublicAcls", false),
            restrict_public_buckets: block.get_bool_or_default("RestrictPublicBuckets", false),
        }),
        encryption: encryption(resource, props),
        versioning,
        logging,
        acl: props
            .get_string_or_default("AccessControl", "Private")
            .map(|acl| canned_acl(acl)),
    }
}

/// The first `ServerSideEncryptionConfiguration` rule of a bucket.
fn encryption(resource: &Block, props: &Block) -> Encryption {
    let missing = props.metadata().child("BucketEncryption");
    let Some(rule) = props.get_nested_block("BucketEncryption.ServerSideEncryptionConfiguration") else {
        return Encryption {
            metadata: resource.metadata().clone(),
            enabled: Value::default_from(false, &missing),
            algorithm: Value::default_from(String::new(), &missing),
            kms_key_id: Value::default_from(String::new(), &missing),
        };
    };

    let (algorithm, kms_key_id) = match rule.get_block("ServerSideEncryptionByDefault") {
        Some(default) => (
            default.get_string_or_default("SSEAlgorithm", ""),
            default.get_string_or_default("KMSMasterKeyID", ""),
        ),
        None => (
            Value::default_from(String::new(), &rule.metadata().child("ServerSideEncryptionByDefault")),
            Value::default_from(String::new(), &rule.metadata().child("ServerSideEncryptionByDefault")),
        ),
    };
    Encryption {
        metadata: rule.metadata().clone(),
        enabled: algorithm.map(|a| !a.is_empty()),
        algorithm,
        kms_key_id,
    }
}

/// `PublicReadWrite` to `public-read-write`, matching the Terraform spelling.
fn canned_acl(acl: &str) -> String {
    let mut out = String::with_capacity(acl.len() + 4);
    for (i, c) in acl.chars().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            out.push('-');
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{CloudFormationParser, Parser};
    use std::path::Path;
    use test_case::test_case;

    const TEMPLATE: &str = r#"AWSTemplateFormatVersion: "2010-09-09"
Resources:
  Public:
    Type: AWS::S3::Bucket
    Properties:
      BucketName: public
      AccessControl: PublicRead
      VersioningConfiguration:
        Status: Enabled
      LoggingConfiguration:
        DestinationBucketName: logs
      BucketEncryption:
        ServerSideEncryptionConfiguration:
          - ServerSideEncryptionByDefault:
              SSEAlgorithm: AES256
      PublicAccessBlockConfiguration:
        BlockPublicAcls: true
        RestrictPublicBuckets: "true"
  Bare:
    Type: AWS::S3::Bucket
"#;

    fn buckets() -> Vec<Bucket> {
        let document = CloudFormationParser::new().parse_content(TEMPLATE, Path::new("s3.yaml")).unwrap();
        adapt(&document).buckets
    }

    #[test]
    fn test_configured_bucket() {
        let buckets = buckets();
        let bucket = &buckets[0];
        assert!(bucket.acl.equal_to("public-read"));
        assert_eq!(bucket.acl.range().start_line(), 7);
        assert!(bucket.versioning.enabled.is_true());
        assert_eq!(bucket.versioning.enabled.range().start_line(), 9);
        assert!(bucket.logging.enabled.is_true());
        assert!(bucket.logging.target_bucket.equal_to("logs"));
        assert!(bucket.encryption.enabled.is_true());
        assert_eq!(bucket.encryption.algorithm.range().start_line(), 15);

        let block = bucket.public_access_block.as_ref().unwrap();
        assert!(block.block_public_acls.is_true());
        assert!(block.restrict_public_buckets.is_true());
        assert!(block.ignore_public_acls.is_false());
        assert!(!block.ignore_public_acls.is_explicit());
    }

    #[test]
    fn test_bare_bucket() {
        let buckets = buckets();
        let bucket = &buckets[1];
        assert!(bucket.acl.equal_to("private"));
        assert!(bucket.encryption.enabled.is_false());
        assert!(bucket.logging.enabled.is_false());
        assert!(bucket.versioning.enabled.is_false());
        assert!(bucket.public_access_block.is_none());
        assert_eq!(bucket.acl.range(), bucket.metadata.range());
    }

    #[test_case("Private", "private")]
    #[test_case("PublicReadWrite", "public-read-write")]
    #[test_case("LogDeliveryWrite", "log-delivery-write")]
    #[test_case("AwsExecRead", "aws-exec-read")]
    fn test_canned_acl(input: &str, expected: &str) {
        assert_eq!(canned_acl(input), expected);
    }
}
