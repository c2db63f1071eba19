//! RDS rules.

use crate::rules::{EngineMetadata, Findings, Rule, RuleDefinition};
use crate::types::{Provider, Severity};

#[must_use]
pub fn rules() -> Vec<Rule> {
    vec![
        encrypt_instance_storage_data(),
        no_classic_resources(),
        no_public_db_access(),
        specify_backup_retention(),
    ]
}

const TERRAFORM_DB_INSTANCE_LINK: &str =
    "https://registry.terraform.io/providers/hashicorp/aws/latest/docs/resources/db_instance";

#[must_use]
pub fn encrypt_instance_storage_data() -> Rule {
    Rule::new(
        RuleDefinition {
            avd_id: "AVD-AWS-0080",
            provider: Provider::Aws,
            service: "rds",
            short_code: "encrypt-instance-storage-data",
            summary: "RDS encryption has not been enabled at a DB Instance level.",
            impact: "Data can be read from RDS instances if compromised",
            resolution: "Enable encryption for RDS instances",
            explanation: "Encryption should be enabled for an RDS Database instances. \
                When enabling encryption by setting the kms_key_id.",
            links: &["https://docs.aws.amazon.com/AmazonRDS/latest/UserGuide/Overview.Encryption.html"],
            terraform: Some(EngineMetadata {
                good_examples: &[r#"
resource "aws_db_instance" "good_example" {
  storage_encrypted = true
  kms_key_id        = "arn:aws:kms:us-east-1:123456789012:key/1234abcd"
}
"#],
                bad_examples: &[
                    r#"
resource "aws_db_instance" "bad_example" {
  storage_encrypted = false
}
"#,
                    r#"
resource "aws_db_instance" "bad_example" {
  engine = "mysql"
}
"#,
                ],
                links: &[TERRAFORM_DB_INSTANCE_LINK],
                remediation_markdown: "Set `storage_encrypted = true` on the instance.",
            }),
            cloudformation: Some(EngineMetadata {
                good_examples: &[r"
Resources:
  GoodExample:
    Type: AWS::RDS::DBInstance
    Properties:
      StorageEncrypted: true
      KmsKeyId: alias/rds
"],
                bad_examples: &[r"
Resources:
  BadExample:
    Type: AWS::RDS::DBInstance
    Properties:
      StorageEncrypted: false
"],
                links: &[],
                remediation_markdown: "Set `StorageEncrypted: true` on the instance.",
            }),
            severity: Severity::High,
        },
        |state| {
            let mut findings = Findings::new();
            for instance in &state.aws.rds.instances {
                // Replicas inherit encryption from their source.
                if !instance.replication_source_arn.is_empty() {
                    continue;
                }
                if instance.encryption.encrypt_storage.is_false() {
                    findings.add(
                        "Instance does not have storage encryption enabled.",
                        &instance.encryption.encrypt_storage,
                    );
                }
            }
            findings
        },
    )
}

#[must_use]
pub fn no_classic_resources() -> Rule {
    Rule::new(
        RuleDefinition {
            avd_id: "AVD-AWS-0081",
            provider: Provider::Aws,
            service: "rds",
            short_code: "no-classic-resources",
            summary: "AWS Classic resource usage.",
            impact: "Classic resources are running in a shared environment with other customers",
            resolution: "Switch to VPC resources",
            explanation: "AWS Classic resources run in a shared environment with infrastructure owned by other AWS \
                customers. You should run resources in a VPC instead.",
            links: &["https://docs.aws.amazon.com/AWSEC2/latest/UserGuide/ec2-classic-platform.html"],
            terraform: Some(EngineMetadata {
                good_examples: &[r#"
resource "aws_security_group" "good_example" {
  name        = "allow_db"
  description = "Database access"
}
"#],
                bad_examples: &[r#"
resource "aws_db_security_group" "bad_example" {
  name = "legacy"

  ingress {
    cidr = "10.0.0.0/24"
  }
}
"#],
                links: &["https://registry.terraform.io/providers/hashicorp/aws/latest/docs/resources/db_security_group"],
                remediation_markdown: "Replace `aws_db_security_group` with a VPC security group.",
            }),
            cloudformation: Some(EngineMetadata {
                good_examples: &[r"
Resources:
  GoodExample:
    Type: AWS::EC2::SecurityGroup
    Properties:
      GroupDescription: Database access
"],
                bad_examples: &[r"
Resources:
  BadExample:
    Type: AWS::RDS::DBSecurityGroup
    Properties:
      GroupDescription: legacy
      DBSecurityGroupIngress:
        - CIDRIP: 10.0.0.0/24
"],
                links: &[],
                remediation_markdown: "Replace `AWS::RDS::DBSecurityGroup` with an `AWS::EC2::SecurityGroup`.",
            }),
            severity: Severity::Critical,
        },
        |state| {
            let mut findings = Findings::new();
            for group in &state.aws.rds.classic.db_security_groups {
                findings.add("Classic resources should not be used.", group);
            }
            findings
        },
    )
}

#[must_use]
pub fn no_public_db_access() -> Rule {
    Rule::new(
        RuleDefinition {
            avd_id: "AVD-AWS-0082",
            provider: Provider::Aws,
            service: "rds",
            short_code: "no-public-db-access",
            summary: "A database resource is marked as publicly accessible.",
            impact: "The database instance is publicly accessible",
            resolution: "Set the database to not be publicly accessible",
            explanation: "Database resources should not publicly available. You should limit all access to the \
                minimum that is required for your application to function.",
            links: &["https://docs.aws.amazon.com/AmazonRDS/latest/UserGuide/USER_VPC.WorkingWithRDSInstanceinaVPC.html#USER_VPC.Hiding"],
            terraform: Some(EngineMetadata {
                good_examples: &[r#"
resource "aws_db_instance" "good_example" {
  publicly_accessible = false
}
"#],
                bad_examples: &[r#"
resource "aws_db_instance" "bad_example" {
  publicly_accessible = true
}
"#],
                links: &[TERRAFORM_DB_INSTANCE_LINK],
                remediation_markdown: "Set `publicly_accessible = false`.",
            }),
            cloudformation: Some(EngineMetadata {
                good_examples: &[r"
Resources:
  GoodExample:
    Type: AWS::RDS::DBInstance
    Properties:
      PubliclyAccessible: false
"],
                bad_examples: &[r"
Resources:
  BadExample:
    Type: AWS::RDS::DBInstance
    Properties:
      PubliclyAccessible: true
"],
                links: &[],
                remediation_markdown: "Set `PubliclyAccessible: false`.",
            }),
            severity: Severity::Critical,
        },
        |state| {
            let mut findings = Findings::new();
            for instance in &state.aws.rds.instances {
                if instance.publicly_accessible.is_true() {
                    findings.add("Instance has Public Access enabled.", &instance.publicly_accessible);
                }
            }
            findings
        },
    )
}

#[must_use]
pub fn specify_backup_retention() -> Rule {
    Rule::new(
        RuleDefinition {
            avd_id: "AVD-AWS-0077",
            provider: Provider::Aws,
            service: "rds",
            short_code: "specify-backup-retention",
            summary: "RDS Cluster and RDS instance should have backup retention longer than default 1 day",
            impact: "Potential loss of data and short opportunity for recovery",
            resolution: "Explicitly set the retention period to greater than the default",
            explanation: "RDS backup retention for clusters defaults to 1 day, this may not be enough to identify \
                and respond to an issue. Backup retention periods should be set to a period that is a balance on \
                cost and limiting risk.",
            links: &["https://docs.aws.amazon.com/AmazonRDS/latest/UserGuide/USER_WorkingWithAutomatedBackups.html#USER_WorkingWithAutomatedBackups.BackupRetention"],
            terraform: Some(EngineMetadata {
                good_examples: &[r#"
resource "aws_db_instance" "good_example" {
  backup_retention_period = 5
}
"#],
                bad_examples: &[
                    r#"
resource "aws_db_instance" "bad_example" {
  allocated_storage = 10
}
"#,
                    r#"
resource "aws_db_instance" "bad_example" {
  backup_retention_period = 1
}
"#,
                ],
                links: &[TERRAFORM_DB_INSTANCE_LINK],
                remediation_markdown: "Set `backup_retention_period` to 2 days or more.",
            }),
            cloudformation: Some(EngineMetadata {
                good_examples: &[r"
Resources:
  GoodExample:
    Type: AWS::RDS::DBInstance
    Properties:
      BackupRetentionPeriod: 30
"],
                bad_examples: &[r"
Resources:
  BadExample:
    Type: AWS::RDS::DBInstance
    Properties:
      DBInstanceClass: db.t3.micro
"],
                links: &[],
                remediation_markdown: "Set `BackupRetentionPeriod` to 2 days or more.",
            }),
            severity: Severity::Medium,
        },
        |state| {
            let mut findings = Findings::new();
            for instance in &state.aws.rds.instances {
                if !instance.replication_source_arn.is_empty() {
                    continue;
                }
                if instance.backup_retention_period_days.less_than(2) {
                    findings.add(
                        "Instance has very low backup retention period.",
                        &instance.backup_retention_period_days,
                    );
                }
            }
            findings
        },
    )
}
