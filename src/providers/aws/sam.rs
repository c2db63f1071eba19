//! Serverless Application Model.

use crate::impl_has_metadata;
use crate::provenance::{BoolValue, Metadata, StringValue};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sam {
    pub apis: Vec<Api>,
    pub http_apis: Vec<HttpApi>,
    pub functions: Vec<Function>,
    pub state_machines: Vec<StateMachine>,
    pub simple_tables: Vec<SimpleTable>,
    pub applications: Vec<Application>,
}

impl Sam {
    pub fn merge(&mut self, other: Self) {
        self.apis.extend(other.apis);
        self.http_apis.extend(other.http_apis);
        self.functions.extend(other.functions);
        self.state_machines.extend(other.state_machines);
        self.simple_tables.extend(other.simple_tables);
        self.applications.extend(other.applications);
    }

    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.apis.len()
            + self.http_apis.len()
            + self.functions.len()
            + self.state_machines.len()
            + self.simple_tables.len()
            + self.applications.len()
    }
}

/// `AWS::Serverless::Api`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Api {
    pub metadata: Metadata,
    pub name: StringValue,
    pub tracing_enabled: BoolValue,
    pub domain_configuration: DomainConfiguration,
    pub access_logging: AccessLogging,
    pub rest_method_settings: RestMethodSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainConfiguration {
    pub metadata: Metadata,
    pub name: StringValue,
    pub security_policy: StringValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessLogging {
    pub metadata: Metadata,
    pub cloudwatch_log_group_arn: StringValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestMethodSettings {
    pub metadata: Metadata,
    pub cache_data_encrypted: BoolValue,
    pub logging_enabled: BoolValue,
    pub data_tracing_enabled: BoolValue,
    pub metrics_enabled: BoolValue,
}

/// `AWS::Serverless::HttpApi`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpApi {
    pub metadata: Metadata,
    pub name: StringValue,
    pub access_logging: AccessLogging,
    pub default_route_settings: RouteSettings,
    pub domain_configuration: DomainConfiguration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSettings {
    pub metadata: Metadata,
    pub logging_enabled: BoolValue,
    pub data_trace_enabled: BoolValue,
    pub detailed_metrics_enabled: BoolValue,
}

/// `AWS::Serverless::Function`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    pub metadata: Metadata,
    pub function_name: StringValue,
    /// `Active` or `PassThrough`
    pub tracing: StringValue,
    pub managed_policies: Vec<StringValue>,
}

/// `AWS::Serverless::StateMachine`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateMachine {
    pub metadata: Metadata,
    pub name: StringValue,
    pub logging_configuration: LoggingConfiguration,
    pub managed_policies: Vec<StringValue>,
    pub tracing: TracingConfiguration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggingConfiguration {
    pub metadata: Metadata,
    pub logging_enabled: BoolValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TracingConfiguration {
    pub metadata: Metadata,
    pub enabled: BoolValue,
}

/// `AWS::Serverless::SimpleTable`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimpleTable {
    pub metadata: Metadata,
    pub table_name: StringValue,
    pub sse_specification: SseSpecification,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SseSpecification {
    pub metadata: Metadata,
    pub enabled: BoolValue,
    pub kms_master_key_id: StringValue,
}

/// `AWS::Serverless::Application`
///
/// `Location` is either a path/URL string (kept in `location_path`) or a
/// mapping naming a Serverless Application Repository entry (kept in
/// `location`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Application {
    pub metadata: Metadata,
    pub location_path: StringValue,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub metadata: Metadata,
    pub application_id: StringValue,
    pub semantic_version: StringValue,
}

impl_has_metadata!(
    Api,
    DomainConfiguration,
    AccessLogging,
    RestMethodSettings,
    HttpApi,
    RouteSettings,
    Function,
    StateMachine,
    LoggingConfiguration,
    TracingConfiguration,
    SimpleTable,
    SseSpecification,
    Application,
    Location,
);
