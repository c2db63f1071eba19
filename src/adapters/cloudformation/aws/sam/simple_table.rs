use crate::adapters::cloudformation::properties;
use crate::document::Document;
use crate::provenance::{HasMetadata, Value};
use crate::providers::aws::sam::{SimpleTable, SseSpecification};

pub(super) fn get_simple_tables(document: &Document) -> Vec<SimpleTable> {
    document
        .resources_of_type("AWS::Serverless::SimpleTable")
        .into_iter()
        .map(|resource| {
            let props = properties(resource);
            SimpleTable {
                metadata: resource.metadata().clone(),
                table_name: props.get_string_or_default("TableName", ""),
                sse_specification: props.get_block("SSESpecification").map_or_else(
                    || {
                        let missing = props.metadata().child("SSESpecification");
                        SseSpecification {
                            metadata: resource.metadata().clone(),
                            enabled: Value::default_from(false, &missing),
                            kms_master_key_id: Value::default_from(String::new(), &missing),
                        }
                    },
                    |sse| SseSpecification {
                        metadata: sse.metadata().clone(),
                        enabled: sse.get_bool_or_default("SSEEnabled", false),
                        kms_master_key_id: sse.get_string_or_default("KMSMasterKeyId", ""),
                    },
                ),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::fixture;
    use super::*;

    #[test]
    fn test_simple_tables() {
        let document = fixture::document(
            r#"Transform: AWS::Serverless-2016-10-31
Resources:
  Encrypted:
    Type: AWS::Serverless::SimpleTable
    Properties:
      TableName: orders
      SSESpecification:
        SSEEnabled: true
  Plain:
    Type: AWS::Serverless::SimpleTable
    Properties:
      TableName: plain
"#,
        );
        let tables = get_simple_tables(&document);

        assert!(tables[0].sse_specification.enabled.is_true());
        assert_eq!(tables[0].sse_specification.enabled.range().start_line(), 8);
        assert!(tables[1].table_name.equal_to("plain"));
        assert!(tables[1].sse_specification.enabled.is_false());
        assert!(!tables[1].sse_specification.enabled.is_explicit());
        assert_eq!(tables[1].sse_specification.enabled.range(), tables[1].metadata.range());
    }
}
