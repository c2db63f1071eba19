use super::super::properties;
use crate::adapters::terraform::aws::rds::DEFAULT_BACKUP_RETENTION_DAYS;
use crate::document::{Block, Document};
use crate::provenance::HasMetadata;
use crate::providers::aws::rds::{Classic, DbSecurityGroup, Encryption, Instance, Rds};

#[must_use]
pub fn adapt(document: &Document) -> Rds {
    Rds {
        instances: document
            .resources_of_type("AWS::RDS::DBInstance")
            .into_iter()
            .map(adapt_instance)
            .collect(),
        classic: Classic {
            db_security_groups: document
                .resources_of_type("AWS::RDS::DBSecurityGroup")
                .into_iter()
                .map(|block| DbSecurityGroup {
                    metadata: block.metadata().clone(),
                })
                .collect(),
        },
    }
}

fn adapt_instance(resource: &Block) -> Instance {
    let props = properties(resource);
    Instance {
        metadata: resource.metadata().clone(),
        backup_retention_period_days: props.get_int_or_default("BackupRetentionPeriod", DEFAULT_BACKUP_RETENTION_DAYS),
        replication_source_arn: props.get_string_or_default("SourceDBInstanceIdentifier", ""),
        publicly_accessible: props.get_bool_or_default("PubliclyAccessible", false),
        encryption: Encryption {
            metadata: resource.metadata().clone(),
            encrypt_storage: props.get_bool_or_default("StorageEncrypted", false),
            kms_key_id: props.get_string_or_default("KmsKeyId", ""),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{CloudFormationParser, Parser};
    use std::path::Path;

    const TEMPLATE: &str = r#"AWSTemplateFormatVersion: "2010-09-09"
Resources:
  Legacy:
    Type: AWS::RDS::DBSecurityGroup
    Properties:
      GroupDescription: legacy
  Db:
    Type: AWS::RDS::DBInstance
    Properties:
      StorageEncrypted: true
      KmsKeyId: !Ref Key
      BackupRetentionPeriod: "7"
  Replica:
    Type: AWS::RDS::DBInstance
    Properties:
      SourceDBInstanceIdentifier: source-db
      PubliclyAccessible: true
"#;

    #[test]
    fn test_adapt() {
        let document = CloudFormationParser::new().parse_content(TEMPLATE, Path::new("db.yaml")).unwrap();
        let rds = adapt(&document);

        assert_eq!(rds.classic.db_security_groups.len(), 1);
        assert_eq!(rds.classic.db_security_groups[0].metadata.range().start_line(), 3);

        let db = &rds.instances[0];
        assert!(db.encryption.encrypt_storage.is_true());
        assert_eq!(db.encryption.encrypt_storage.range().start_line(), 10);
        assert!(!db.encryption.kms_key_id.is_resolvable());
        assert_eq!(*db.backup_retention_period_days.value(), 7);
        assert!(db.publicly_accessible.is_false());

        let replica = &rds.instances[1];
        assert!(replica.replication_source_arn.equal_to("source-db"));
        assert!(replica.publicly_accessible.is_true());
        assert!(replica.encryption.encrypt_storage.is_false());
        assert!(!replica.encryption.encrypt_storage.is_explicit());
    }
}
