use super::managed_policies;
use crate::adapters::cloudformation::properties;
use crate::document::{Block, Document};
use crate::provenance::{HasMetadata, Value};
use crate::providers::aws::sam::{LoggingConfiguration, StateMachine, TracingConfiguration};

pub(super) fn get_state_machines(document: &Document) -> Vec<StateMachine> {
    document
        .resources_of_type("AWS::Serverless::StateMachine")
        .into_iter()
        .map(|resource| {
            let props = properties(resource);
            StateMachine {
                metadata: resource.metadata().clone(),
                name: props.get_string_or_default("Name", ""),
                logging_configuration: logging_configuration(resource, props),
                managed_policies: managed_policies(props),
                tracing: props.get_block("Tracing").map_or_else(
                    || TracingConfiguration {
                        metadata: resource.metadata().clone(),
                        enabled: Value::default_from(false, &props.metadata().child("Tracing")),
                    },
                    |tracing| TracingConfiguration {
                        metadata: tracing.metadata().clone(),
                        enabled: tracing.get_bool_or_default("Enabled", false),
                    },
                ),
            }
        })
        .collect()
}

/// Logging is enabled by a `Logging` block whose `Level` is not `OFF`.
fn logging_configuration(resource: &Block, props: &Block) -> LoggingConfiguration {
    let Some(logging) = props.get_block("Logging") else {
        return LoggingConfiguration {
            metadata: resource.metadata().clone(),
            logging_enabled: Value::default_from(false, &props.metadata().child("Logging")),
        };
    };

    LoggingConfiguration {
        metadata: logging.metadata().clone(),
        logging_enabled: logging
            .get_string_or_default("Level", "OFF")
            .map(|level| !level.eq_ignore_ascii_case("OFF")),
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixture;
    use super::*;

    #[test]
    fn test_state_machines() {
        let document = fixture::document(
            r#"Transform: AWS::Serverless-2016-10-31
Resources:
  Logged:
    Type: AWS::Serverless::StateMachine
    Properties:
      Name: orders
      Logging:
        Level: ALL
        IncludeExecutionData: true
      Tracing:
        Enabled: true
      Policies:
        - AWSXrayWriteOnlyAccess
  Silent:
    Type: AWS::Serverless::StateMachine
    Properties:
      Logging:
        Level: "OFF"
"#,
        );
        let machines = get_state_machines(&document);

        let logged = &machines[0];
        assert!(logged.logging_configuration.logging_enabled.is_true());
        assert_eq!(logged.logging_configuration.logging_enabled.range().start_line(), 8);
        assert!(logged.tracing.enabled.is_true());
        assert_eq!(logged.managed_policies.len(), 1);

        let silent = &machines[1];
        assert!(silent.logging_configuration.logging_enabled.is_false());
        assert!(silent.logging_configuration.logging_enabled.is_explicit());
        assert!(silent.tracing.enabled.is_false());
    }
}
