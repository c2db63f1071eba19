use crate::document::{Block, Document};
use crate::provenance::HasMetadata;
use crate::providers::aws::rds::{Classic, DbSecurityGroup, Encryption, Instance, Rds};

/// AWS creates instances with one day of automated backups when the
/// retention period is omitted.
pub const DEFAULT_BACKUP_RETENTION_DAYS: i64 = 1;

#[must_use]
pub fn adapt(documents: &[Document]) -> Rds {
    Rds {
        instances: documents
            .iter()
            .flat_map(|document| document.resources_of_type("aws_db_instance"))
            .map(adapt_instance)
            .collect(),
        classic: Classic {
            db_security_groups: documents
                .iter()
                .flat_map(|document| document.resources_of_type("aws_db_security_group"))
                .map(|block| DbSecurityGroup {
                    metadata: block.metadata().clone(),
                })
                .collect(),
        },
    }
}

fn adapt_instance(block: &Block) -> Instance {
    Instance {
        metadata: block.metadata().clone(),
        backup_retention_period_days: block.get_int_or_default("backup_retention_period", DEFAULT_BACKUP_RETENTION_DAYS),
        replication_source_arn: block.get_string_or_default("replicate_source_db", ""),
        publicly_accessible: block.get_bool_or_default("publicly_accessible", false),
        encryption: Encryption {
            metadata: block.metadata().clone(),
            encrypt_storage: block.get_bool_or_default("storage_encrypted", false),
            kms_key_id: block.get_string_or_default("kms_key_id", ""),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{HclParser, Parser};
    use std::path::Path;

    fn adapt_source(source: &str) -> Rds {
        let document = HclParser::new().parse_content(source, Path::new("main.tf")).unwrap();
        adapt(&[document])
    }

    #[test]
    fn test_instance_fields() {
        let rds = adapt_source(
            r#"
resource "aws_db_instance" "db" {
  storage_encrypted       = true
  kms_key_id              = "arn:aws:kms:us-east-1:123456789012:key/1"
  backup_retention_period = 7
  publicly_accessible     = false
}
"#,
        );

        let instance = &rds.instances[0];
        assert!(instance.encryption.encrypt_storage.is_true());
        assert_eq!(instance.encryption.encrypt_storage.range().start_line(), 3);
        assert!(instance.encryption.kms_key_id.starts_with("arn:aws:kms"));
        assert_eq!(*instance.backup_retention_period_days.value(), 7);
        assert!(instance.publicly_accessible.is_false());
        assert!(instance.publicly_accessible.is_explicit());
    }

    #[test]
    fn test_omitted_fields_default_to_block() {
        let rds = adapt_source("resource \"aws_db_instance\" \"db\" {\n  engine = \"postgres\"\n}\n");
        let instance = &rds.instances[0];
        assert!(instance.encryption.encrypt_storage.is_false());
        assert!(!instance.encryption.encrypt_storage.is_explicit());
        assert_eq!(instance.encryption.encrypt_storage.range(), instance.metadata.range());
        assert!(instance.backup_retention_period_days.less_than(2));
        assert!(instance.replication_source_arn.is_empty());
    }

    #[test]
    fn test_classic_security_groups() {
        let rds = adapt_source(
            r#"
resource "aws_db_security_group" "legacy" {
  name = "legacy"
}

resource "aws_db_security_group" "other" {
  name = "other"
}
"#,
        );
        let groups = &rds.classic.db_security_groups;
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].metadata.range().start_line(), 2);
        assert_eq!(groups[1].metadata.range().start_line(), 6);
    }
}
