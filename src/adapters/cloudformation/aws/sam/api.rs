use crate::adapters::cloudformation::properties;
use crate::document::{Block, Document};
use crate::provenance::{BoolValue, HasMetadata, Metadata, Value};
use crate::providers::aws::sam::{AccessLogging, Api, DomainConfiguration, RestMethodSettings};

/// API Gateway's policy when a custom domain does not name one.
pub(super) const DEFAULT_SECURITY_POLICY: &str = "TLS_1_0";

pub(super) fn get_apis(document: &Document) -> Vec<Api> {
    document
        .resources_of_type("AWS::Serverless::Api")
        .into_iter()
        .map(|resource| {
            let props = properties(resource);
            Api {
                metadata: resource.metadata().clone(),
                name: props.get_string_or_default("Name", ""),
                tracing_enabled: props.get_bool_or_default("TracingEnabled", false),
                domain_configuration: domain_configuration(resource, props),
                access_logging: access_logging(resource, props, "AccessLogSetting"),
                rest_method_settings: method_settings(resource, props),
            }
        })
        .collect()
}

pub(super) fn domain_configuration(resource: &Block, props: &Block) -> DomainConfiguration {
    match props.get_block("Domain") {
        Some(domain) => DomainConfiguration {
            metadata: domain.metadata().clone(),
            name: domain.get_string_or_default("DomainName", ""),
            security_policy: domain.get_string_or_default("SecurityPolicy", DEFAULT_SECURITY_POLICY),
        },
        None => {
            let missing = props.metadata().child("Domain");
            DomainConfiguration {
                metadata: resource.metadata().clone(),
                name: Value::default_from(String::new(), &missing),
                security_policy: Value::default_from(DEFAULT_SECURITY_POLICY.to_string(), &missing),
            }
        }
    }
}

/// Access logging from `AccessLogSetting` (REST) or `AccessLogSettings` (HTTP).
pub(super) fn access_logging(resource: &Block, props: &Block, property: &str) -> AccessLogging {
    props.get_block(property).map_or_else(
        || AccessLogging {
            metadata: resource.metadata().clone(),
            cloudwatch_log_group_arn: Value::default_from(String::new(), &props.metadata().child(property)),
        },
        |setting| AccessLogging {
            metadata: setting.metadata().clone(),
            cloudwatch_log_group_arn: setting.get_string_or_default("DestinationArn", ""),
        },
    )
}

/// Settings of the first `MethodSettings` entry.
fn method_settings(resource: &Block, props: &Block) -> RestMethodSettings {
    let Some(settings) = props.get_block("MethodSettings") else {
        let missing = props.metadata().child("MethodSettings");
        return RestMethodSettings {
            metadata: resource.metadata().clone(),
            cache_data_encrypted: Value::default_from(false, &missing),
            logging_enabled: Value::default_from(false, &missing),
            data_tracing_enabled: Value::default_from(false, &missing),
            metrics_enabled: Value::default_from(false, &missing),
        };
    };

    RestMethodSettings {
        metadata: settings.metadata().clone(),
        cache_data_encrypted: settings.get_bool_or_default("CacheDataEncrypted", false),
        logging_enabled: logging_level(settings, &settings.metadata().child("LoggingLevel")),
        data_tracing_enabled: settings.get_bool_or_default("DataTraceEnabled", false),
        metrics_enabled: settings.get_bool_or_default("MetricsEnabled", false),
    }
}

/// Logging is on for any `LoggingLevel` other than `OFF`.
pub(super) fn logging_level(settings: &Block, missing: &Metadata) -> BoolValue {
    settings.get_attribute("LoggingLevel").map_or_else(
        || Value::default_from(false, missing),
        |level| level.as_string_value().map(|level| !level.eq_ignore_ascii_case("OFF")),
    )
}

#[cfg(test)]
mod tests {
    use super::super::fixture;
    use super::*;

    #[test]
    fn test_api() {
        let document = fixture::document(
            r#"Transform: AWS::Serverless-2016-10-31
Resources:
  Api:
    Type: AWS::Serverless::Api
    Properties:
      Name: orders
      TracingEnabled: true
      Domain:
        DomainName: api.example.com
        SecurityPolicy: TLS_1_2
      AccessLogSetting:
        DestinationArn: arn:aws:logs:us-east-1:123456789012:log-group:api
        Format: json
      MethodSettings:
        - LoggingLevel: INFO
          CacheDataEncrypted: true
          HttpMethod: "*"
          ResourcePath: "/*"
  Bare:
    Type: AWS::Serverless::Api
    Properties:
      StageName: prod
"#,
        );
        let apis = get_apis(&document);

        let api = &apis[0];
        assert!(api.name.equal_to("orders"));
        assert!(api.tracing_enabled.is_true());
        assert!(api.domain_configuration.security_policy.equal_to("TLS_1_2"));
        assert_eq!(api.domain_configuration.security_policy.range().start_line(), 10);
        assert!(api.access_logging.cloudwatch_log_group_arn.starts_with("arn:aws:logs"));
        assert!(api.rest_method_settings.logging_enabled.is_true());
        assert!(api.rest_method_settings.cache_data_encrypted.is_true());
        assert_eq!(api.rest_method_settings.logging_enabled.range().start_line(), 15);

        let bare = &apis[1];
        assert!(bare.domain_configuration.security_policy.equal_to(DEFAULT_SECURITY_POLICY));
        assert!(!bare.domain_configuration.security_policy.is_explicit());
        assert!(bare.access_logging.cloudwatch_log_group_arn.is_empty());
        assert!(bare.rest_method_settings.logging_enabled.is_false());
        assert_eq!(bare.access_logging.metadata.range(), bare.metadata.range());
    }
}
