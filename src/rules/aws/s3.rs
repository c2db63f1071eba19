//! S3 rules.

use crate::providers::aws::s3::PUBLIC_ACLS;
use crate::rules::{EngineMetadata, Findings, Rule, RuleDefinition};
use crate::types::{Provider, Severity};

#[must_use]
pub fn rules() -> Vec<Rule> {
    vec![
        block_public_acls(),
        enable_bucket_encryption(),
        enable_bucket_logging(),
        enable_versioning(),
        no_public_access_with_acl(),
    ]
}

const TERRAFORM_BUCKET_LINK: &str = "https://registry.terraform.io/providers/hashicorp/aws/latest/docs/resources/s3_bucket";

#[must_use]
pub fn block_public_acls() -> Rule {
    Rule::new(
        RuleDefinition {
            avd_id: "AVD-AWS-0086",
            provider: Provider::Aws,
            service: "s3",
            short_code: "block-public-acls",
            summary: "S3 Access block should block public ACL",
            impact: "PUT calls with public ACLs specified can make objects public",
            resolution: "Enable blocking any PUT calls with a public ACL specified",
            explanation: "S3 buckets should block public ACLs on buckets and any objects they contain. By blocking, \
                PUTs will fail if the object has any public ACL.",
            links: &["https://docs.aws.amazon.com/AmazonS3/latest/dev-retired/access-control-block-public-access.html"],
            terraform: Some(EngineMetadata {
                good_examples: &[r#"
resource "aws_s3_bucket" "example" {
  bucket = "example"
}

resource "aws_s3_bucket_public_access_block" "good_example" {
  bucket            = aws_s3_bucket.example.id
  block_public_acls = true
}
"#],
                bad_examples: &[
                    r#"
resource "aws_s3_bucket" "example" {
  bucket = "example"
}

resource "aws_s3_bucket_public_access_block" "bad_example" {
  bucket = aws_s3_bucket.example.id
}
"#,
                    r#"
resource "aws_s3_bucket" "example" {
  bucket = "example"
}
"#,
                ],
                links: &["https://registry.terraform.io/providers/hashicorp/aws/latest/docs/resources/s3_bucket_public_access_block#block_public_acls"],
                remediation_markdown: "Set `block_public_acls = true` in an `aws_s3_bucket_public_access_block` for the bucket.",
            }),
            cloudformation: Some(EngineMetadata {
                good_examples: &[r"
Resources:
  GoodExample:
    Type: AWS::S3::Bucket
    Properties:
      PublicAccessBlockConfiguration:
        BlockPublicAcls: true
        BlockPublicPolicy: true
        IgnorePublicAcls: true
        RestrictPublicBuckets: true
"],
                bad_examples: &[r"
Resources:
  BadExample:
    Type: AWS::S3::Bucket
    Properties:
      PublicAccessBlockConfiguration:
        BlockPublicAcls: false
"],
                links: &[],
                remediation_markdown: "Set `PublicAccessBlockConfiguration.BlockPublicAcls: true`.",
            }),
            severity: Severity::High,
        },
        |state| {
            let mut findings = Findings::new();
            for bucket in &state.aws.s3.buckets {
                match &bucket.public_access_block {
                    None => findings.add("No public access block so not blocking public acls", bucket),
                    Some(block) if block.block_public_acls.is_false() => {
                        findings.add("Public access block does not block public ACLs", &block.block_public_acls);
                    }
                    Some(_) => {}
                }
            }
            findings
        },
    )
}

#[must_use]
pub fn enable_bucket_encryption() -> Rule {
    Rule::new(
        RuleDefinition {
            avd_id: "AVD-AWS-0088",
            provider: Provider::Aws,
            service: "s3",
            short_code: "enable-bucket-encryption",
            summary: "Unencrypted S3 bucket.",
            impact: "The bucket objects could be read if compromised",
            resolution: "Configure bucket encryption",
            explanation: "S3 Buckets should be encrypted to protect the data that is stored within them if access \
                is compromised.",
            links: &["https://docs.aws.amazon.com/AmazonS3/latest/dev/bucket-encryption.html"],
            terraform: Some(EngineMetadata {
                good_examples: &[
                    r#"
resource "aws_s3_bucket" "good_example" {
  bucket = "mybucket"

  server_side_encryption_configuration {
    rule {
      apply_server_side_encryption_by_default {
        kms_master_key_id = "arn"
        sse_algorithm     = "aws:kms"
      }
    }
  }
}
"#,
                    r#"
resource "aws_s3_bucket" "good_example" {
  bucket = "mybucket"
}

resource "aws_s3_bucket_server_side_encryption_configuration" "good_example" {
  bucket = aws_s3_bucket.good_example.id

  rule {
    apply_server_side_encryption_by_default {
      sse_algorithm = "AES256"
    }
  }
}
"#,
                ],
                bad_examples: &[r#"
resource "aws_s3_bucket" "bad_example" {
  bucket = "mybucket"
}
"#],
                links: &[TERRAFORM_BUCKET_LINK],
                remediation_markdown: "Add a `server_side_encryption_configuration` for the bucket.",
            }),
            cloudformation: Some(EngineMetadata {
                good_examples: &[r"
Resources:
  GoodExample:
    Type: AWS::S3::Bucket
    Properties:
      BucketEncryption:
        ServerSideEncryptionConfiguration:
          - ServerSideEncryptionByDefault:
              SSEAlgorithm: AES256
"],
                bad_examples: &[r"
Resources:
  BadExample:
    Type: AWS::S3::Bucket
    Properties:
      BucketName: mybucket
"],
                links: &[],
                remediation_markdown: "Add `BucketEncryption` to the bucket.",
            }),
            severity: Severity::High,
        },
        |state| {
            let mut findings = Findings::new();
            for bucket in &state.aws.s3.buckets {
                if bucket.encryption.enabled.is_false() {
                    findings.add("Bucket does not have encryption enabled", &bucket.encryption.enabled);
                }
            }
            findings
        },
    )
}

#[must_use]
pub fn enable_bucket_logging() -> Rule {
    Rule::new(
        RuleDefinition {
            avd_id: "AVD-AWS-0089",
            provider: Provider::Aws,
            service: "s3",
            short_code: "enable-bucket-logging",
            summary: "S3 Bucket does not have logging enabled.",
            impact: "There is no way to determine the access to this bucket",
            resolution: "Add a logging block to the resource to enable access logging",
            explanation: "Buckets should have logging enabled so that access can be audited. Log target buckets \
                themselves are exempt.",
            links: &["https://docs.aws.amazon.com/AmazonS3/latest/dev/ServerLogs.html"],
            terraform: Some(EngineMetadata {
                good_examples: &[
                    r#"
resource "aws_s3_bucket" "good_example" {
  bucket = "data"

  logging {
    target_bucket = "target-bucket"
  }
}
"#,
                    r#"
resource "aws_s3_bucket" "logs" {
  bucket = "logs"
  acl    = "log-delivery-write"
}
"#,
                ],
                bad_examples: &[r#"
resource "aws_s3_bucket" "bad_example" {
  bucket = "data"
}
"#],
                links: &[TERRAFORM_BUCKET_LINK],
                remediation_markdown: "Add a `logging` block or an `aws_s3_bucket_logging` resource.",
            }),
            cloudformation: Some(EngineMetadata {
                good_examples: &[r"
Resources:
  GoodExample:
    Type: AWS::S3::Bucket
    Properties:
      LoggingConfiguration:
        DestinationBucketName: logging-bucket
        LogFilePrefix: accesslogs/
"],
                bad_examples: &[r"
Resources:
  BadExample:
    Type: AWS::S3::Bucket
    Properties:
      BucketName: data
"],
                links: &[],
                remediation_markdown: "Add a `LoggingConfiguration` to the bucket.",
            }),
            severity: Severity::Medium,
        },
        |state| {
            let mut findings = Findings::new();
            for bucket in &state.aws.s3.buckets {
                if bucket.logging.enabled.is_false() && !bucket.acl.equal_to("log-delivery-write") {
                    findings.add("Bucket does not have logging enabled", &bucket.logging.enabled);
                }
            }
            findings
        },
    )
}

#[must_use]
pub fn enable_versioning() -> Rule {
    Rule::new(
        RuleDefinition {
            avd_id: "AVD-AWS-0090",
            provider: Provider::Aws,
            service: "s3",
            short_code: "enable-versioning",
            summary: "S3 Data should be versioned",
            impact: "Deleted or modified data would not be recoverable",
            resolution: "Enable versioning to protect against accidental/malicious removal or modification",
            explanation: "Versioning in Amazon S3 is a means of keeping multiple variants of an object in the same \
                bucket. You can use the S3 Versioning feature to preserve, retrieve, and restore every version of \
                every object stored in your buckets.",
            links: &["https://docs.aws.amazon.com/AmazonS3/latest/userguide/Versioning.html"],
            terraform: Some(EngineMetadata {
                good_examples: &[
                    r#"
resource "aws_s3_bucket" "good_example" {
  versioning {
    enabled = true
  }
}
"#,
                    r#"
resource "aws_s3_bucket" "example" {
  bucket = "yournamehere"
}

resource "aws_s3_bucket_versioning" "good_example" {
  bucket = aws_s3_bucket.example.id

  versioning_configuration {
    status = "Enabled"
  }
}
"#,
                ],
                bad_examples: &[r#"
resource "aws_s3_bucket" "bad_example" {
  versioning {
    enabled = false
  }
}
"#],
                links: &["https://registry.terraform.io/providers/hashicorp/aws/latest/docs/resources/s3_bucket_versioning"],
                remediation_markdown: "Enable versioning with an `aws_s3_bucket_versioning` resource.",
            }),
            cloudformation: Some(EngineMetadata {
                good_examples: &[r"
Resources:
  GoodExample:
    Type: AWS::S3::Bucket
    Properties:
      VersioningConfiguration:
        Status: Enabled
"],
                bad_examples: &[r"
Resources:
  BadExample:
    Type: AWS::S3::Bucket
    Properties:
      VersioningConfiguration:
        Status: Suspended
"],
                links: &[],
                remediation_markdown: "Set `VersioningConfiguration.Status: Enabled`.",
            }),
            severity: Severity::Medium,
        },
        |state| {
            let mut findings = Findings::new();
            for bucket in &state.aws.s3.buckets {
                if bucket.versioning.enabled.is_false() {
                    findings.add("Bucket does not have versioning enabled", &bucket.versioning.enabled);
                }
            }
            findings
        },
    )
}

#[must_use]
pub fn no_public_access_with_acl() -> Rule {
    Rule::new(
        RuleDefinition {
            avd_id: "AVD-AWS-0092",
            provider: Provider::Aws,
            service: "s3",
            short_code: "no-public-access-with-acl",
            summary: "S3 Buckets not publicly accessible through ACL.",
            impact: "Public access to the bucket can lead to data leakage",
            resolution: "Don't use canned ACLs or switch to private acl",
            explanation: "Buckets should not have ACLs that allow public access",
            links: &["https://docs.aws.amazon.com/AmazonS3/latest/userguide/acl-overview.html"],
            terraform: Some(EngineMetadata {
                good_examples: &[r#"
resource "aws_s3_bucket" "good_example" {
  acl = "private"
}
"#],
                bad_examples: &[
                    r#"
resource "aws_s3_bucket" "bad_example" {
  acl = "public-read"
}
"#,
                    r#"
resource "aws_s3_bucket" "example" {
  bucket = "example"
}

resource "aws_s3_bucket_acl" "bad_example" {
  bucket = aws_s3_bucket.example.id
  acl    = "authenticated-read"
}
"#,
                ],
                links: &["https://registry.terraform.io/providers/hashicorp/aws/latest/docs/resources/s3_bucket_acl"],
                remediation_markdown: "Use the `private` canned ACL.",
            }),
            cloudformation: Some(EngineMetadata {
                good_examples: &[r"
Resources:
  GoodExample:
    Type: AWS::S3::Bucket
    Properties:
      AccessControl: Private
"],
                bad_examples: &[r"
Resources:
  BadExample:
    Type: AWS::S3::Bucket
    Properties:
      AccessControl: PublicReadWrite
"],
                links: &[],
                remediation_markdown: "Set `AccessControl: Private`.",
            }),
            severity: Severity::High,
        },
        |state| {
            let mut findings = Findings::new();
            for bucket in &state.aws.s3.buckets {
                if bucket.acl.equal_to("authenticated-read") {
                    findings.add("Bucket is exposed to all AWS accounts via ACL.", &bucket.acl);
                } else if bucket.acl.equal_to_any(PUBLIC_ACLS) {
                    findings.add(format!("Bucket has a public ACL: '{}'.", bucket.acl.as_str()), &bucket.acl);
                }
            }
            findings
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{HclParser, Parser};
    use std::path::Path;

    #[test]
    fn test_acl_finding_points_at_split_resource() {
        let source = r#"
resource "aws_s3_bucket" "data" {
  bucket = "data"
}

resource "aws_s3_bucket_acl" "data" {
  bucket = aws_s3_bucket.data.id
  acl    = "public-read-write"
}
"#;
        let document = HclParser::new().parse_content(source, Path::new("main.tf")).unwrap();
        let state = crate::adapters::terraform::adapt(&[document]);
        let rule = no_public_access_with_acl();
        let findings = rule.check(&state).into_findings(rule.definition(), Severity::High);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].message, "Bucket has a public ACL: 'public-read-write'.");
        let location = &findings[0].locations()[0];
        assert_eq!((location.start_line, location.end_line), (8, 8));
    }

    #[test]
    fn test_missing_public_access_block_points_at_bucket() {
        let document = HclParser::new()
            .parse_content("resource \"aws_s3_bucket\" \"data\" {\n  bucket = \"data\"\n}\n", Path::new("main.tf"))
            .unwrap();
        let state = crate::adapters::terraform::adapt(&[document]);
        let rule = block_public_acls();
        let findings = rule.check(&state).into_findings(rule.definition(), Severity::High);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].locations()[0].start_line, 1);
        assert_eq!(findings[0].locations()[0].end_line, 3);
    }
}
