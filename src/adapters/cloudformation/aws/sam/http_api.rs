use super::api::{access_logging, domain_configuration, logging_level};
use crate::adapters::cloudformation::properties;
use crate::document::{Block, Document};
use crate::provenance::{HasMetadata, Value};
use crate::providers::aws::sam::{HttpApi, RouteSettings};

pub(super) fn get_http_apis(document: &Document) -> Vec<HttpApi> {
    document
        .resources_of_type("AWS::Serverless::HttpApi")
        .into_iter()
        .map(|resource| {
            let props = properties(resource);
            HttpApi {
                metadata: resource.metadata().clone(),
                name: props.get_string_or_default("Name", ""),
                access_logging: access_logging(resource, props, "AccessLogSettings"),
                default_route_settings: route_settings(resource, props),
                domain_configuration: domain_configuration(resource, props),
            }
        })
        .collect()
}

fn route_settings(resource: &Block, props: &Block) -> RouteSettings {
    let Some(settings) = props.get_block("DefaultRouteSettings") else {
        let missing = props.metadata().child("DefaultRouteSettings");
        return RouteSettings {
            metadata: resource.metadata().clone(),
            logging_enabled: Value::default_from(false, &missing),
            data_trace_enabled: Value::default_from(false, &missing),
            detailed_metrics_enabled: Value::default_from(false, &missing),
        };
    };

    RouteSettings {
        metadata: settings.metadata().clone(),
        logging_enabled: logging_level(settings, &settings.metadata().child("LoggingLevel")),
        data_trace_enabled: settings.get_bool_or_default("DataTraceEnabled", false),
        detailed_metrics_enabled: settings.get_bool_or_default("DetailedMetricsEnabled", false),
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixture;
    use super::*;

    #[test]
    fn test_http_api() {
        let document = fixture::document(
            r#"Transform: AWS::Serverless-2016-10-31
Resources:
  Http:
    Type: AWS::Serverless::HttpApi
    Properties:
      AccessLogSettings:
        DestinationArn: !GetAtt Logs.Arn
        Format: "$context.requestId"
      DefaultRouteSettings:
        DetailedMetricsEnabled: true
  Quiet:
    Type: AWS::Serverless::HttpApi
"#,
        );
        let apis = get_http_apis(&document);
        assert_eq!(apis.len(), 2);

        let http = &apis[0];
        assert!(!http.access_logging.cloudwatch_log_group_arn.is_resolvable());
        assert!(!http.access_logging.cloudwatch_log_group_arn.is_empty());
        assert_eq!(http.access_logging.cloudwatch_log_group_arn.range().start_line(), 7);
        assert!(http.default_route_settings.detailed_metrics_enabled.is_true());
        assert!(http.default_route_settings.logging_enabled.is_false());

        let quiet = &apis[1];
        assert!(quiet.access_logging.cloudwatch_log_group_arn.is_empty());
        assert_eq!(quiet.access_logging.cloudwatch_log_group_arn.range(), quiet.metadata.range());
    }
}
