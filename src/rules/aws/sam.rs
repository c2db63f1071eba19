//! Serverless Application Model rules. These only apply to CloudFormation.

use crate::rules::{EngineMetadata, Findings, Rule, RuleDefinition};
use crate::types::{Provider, Severity};

#[must_use]
pub fn rules() -> Vec<Rule> {
    vec![
        api_use_secure_tls_policy(),
        enable_api_access_logging(),
        enable_http_api_access_logging(),
        enable_state_machine_logging(),
        enable_table_encryption(),
        enable_function_tracing(),
    ]
}

fn examples(good: &'static [&'static str], bad: &'static [&'static str], remediation: &'static str) -> Option<EngineMetadata> {
    Some(EngineMetadata {
        good_examples: good,
        bad_examples: bad,
        links: &[],
        remediation_markdown: remediation,
    })
}

#[must_use]
pub fn api_use_secure_tls_policy() -> Rule {
    Rule::new(
        RuleDefinition {
            avd_id: "AVD-AWS-0112",
            provider: Provider::Aws,
            service: "sam",
            short_code: "api-use-secure-tls-policy",
            summary: "SAM API domain name uses outdated SSL/TLS protocols.",
            impact: "Outdated SSL policies increase exposure to known vulnerabilities",
            resolution: "Use the most modern TLS/SSL policies available",
            explanation: "You should not use outdated/insecure TLS versions for encryption. You should be using \
                TLS v1.2+.",
            links: &["https://docs.aws.amazon.com/serverless-application-model/latest/developerguide/sam-property-api-domainconfiguration.html#sam-api-domainconfiguration-securitypolicy"],
            terraform: None,
            cloudformation: examples(
                &[r"
Resources:
  GoodExample:
    Type: AWS::Serverless::Api
    Properties:
      Name: Good SAM API example
      StageName: Prod
      Domain:
        DomainName: api.example.com
        SecurityPolicy: TLS_1_2
"],
                &[
                    r"
Resources:
  BadExample:
    Type: AWS::Serverless::Api
    Properties:
      Name: Bad SAM API example
      StageName: Prod
      Domain:
        DomainName: api.example.com
        SecurityPolicy: TLS_1_0
",
                    r"
Resources:
  BadExample:
    Type: AWS::Serverless::Api
    Properties:
      Name: Bad SAM API example
      StageName: Prod
",
                ],
                "Set `Domain.SecurityPolicy: TLS_1_2`.",
            ),
            severity: Severity::High,
        },
        |state| {
            let mut findings = Findings::new();
            for api in &state.aws.sam.apis {
                let policy = &api.domain_configuration.security_policy;
                if policy.is_resolvable() && !policy.equal_to("TLS_1_2") {
                    findings.add("Domain name is configured with an outdated TLS policy.", policy);
                }
            }
            findings
        },
    )
}

#[must_use]
pub fn enable_api_access_logging() -> Rule {
    Rule::new(
        RuleDefinition {
            avd_id: "AVD-AWS-0113",
            provider: Provider::Aws,
            service: "sam",
            short_code: "enable-api-access-logging",
            summary: "SAM API stages for V1 and V2 should have access logging enabled",
            impact: "Logging provides vital information about access and usage",
            resolution: "Enable logging for API Gateway stages",
            explanation: "API Gateway stages should have access log settings block configured to track all access \
                to a particular stage. This should be applied to both v1 and v2 gateway stages.",
            links: &["https://docs.aws.amazon.com/serverless-application-model/latest/developerguide/sam-resource-api.html#sam-api-accesslogsetting"],
            terraform: None,
            cloudformation: examples(
                &[r"
Resources:
  GoodExample:
    Type: AWS::Serverless::Api
    Properties:
      StageName: Prod
      AccessLogSetting:
        DestinationArn: arn:aws:logs:us-east-1:123456789012:log-group:api-access
        Format: $context.requestId
"],
                &[r"
Resources:
  BadExample:
    Type: AWS::Serverless::Api
    Properties:
      StageName: Prod
"],
                "Add an `AccessLogSetting` with a `DestinationArn`.",
            ),
            severity: Severity::Medium,
        },
        |state| {
            let mut findings = Findings::new();
            for api in &state.aws.sam.apis {
                if api.access_logging.cloudwatch_log_group_arn.is_empty() {
                    findings.add("Access logging is not configured.", &api.access_logging.cloudwatch_log_group_arn);
                }
            }
            findings
        },
    )
}

#[must_use]
pub fn enable_http_api_access_logging() -> Rule {
    Rule::new(
        RuleDefinition {
            avd_id: "AVD-AWS-0116",
            provider: Provider::Aws,
            service: "sam",
            short_code: "enable-http-api-access-logging",
            summary: "SAM HTTP API stages for V1 and V2 should have access logging enabled",
            impact: "Logging provides vital information about access and usage",
            resolution: "Enable logging for API Gateway stages",
            explanation: "API Gateway stages should have access log settings block configured to track all access \
                to a particular stage. This should be applied to both v1 and v2 gateway stages.",
            links: &["https://docs.aws.amazon.com/serverless-application-model/latest/developerguide/sam-resource-httpapi.html#sam-httpapi-accesslogsettings"],
            terraform: None,
            cloudformation: examples(
                &[r#"
Resources:
  GoodExample:
    Type: AWS::Serverless::HttpApi
    Properties:
      AccessLogSettings:
        DestinationArn: !GetAtt AccessLogs.Arn
        Format: "$context.requestId"
"#],
                &[r"
Resources:
  BadExample:
    Type: AWS::Serverless::HttpApi
    Properties:
      StageName: Prod
"],
                "Add `AccessLogSettings` with a `DestinationArn`.",
            ),
            severity: Severity::Medium,
        },
        |state| {
            let mut findings = Findings::new();
            for api in &state.aws.sam.http_apis {
                if api.access_logging.cloudwatch_log_group_arn.is_empty() {
                    findings.add("Access logging is not configured.", &api.access_logging.cloudwatch_log_group_arn);
                }
            }
            findings
        },
    )
}

#[must_use]
pub fn enable_state_machine_logging() -> Rule {
    Rule::new(
        RuleDefinition {
            avd_id: "AVD-AWS-0117",
            provider: Provider::Aws,
            service: "sam",
            short_code: "enable-state-machine-logging",
            summary: "SAM State machine must have logging enabled",
            impact: "Without logging enabled it is difficult to identify suspicious activity",
            resolution: "Enable logging",
            explanation: "Logging enables end-to-end debugging and analysis of all state machine activities.",
            links: &["https://docs.aws.amazon.com/serverless-application-model/latest/developerguide/sam-resource-statemachine.html#sam-statemachine-logging"],
            terraform: None,
            cloudformation: examples(
                &[r"
Resources:
  GoodExample:
    Type: AWS::Serverless::StateMachine
    Properties:
      Name: GoodStateMachine
      Logging:
        Level: ALL
        Destinations:
          - CloudWatchLogsLogGroup:
              LogGroupArn: arn:aws:logs:us-east-1:123456789012:log-group:states
"],
                &[
                    r"
Resources:
  BadExample:
    Type: AWS::Serverless::StateMachine
    Properties:
      Name: BadStateMachine
",
                    r#"
Resources:
  BadExample:
    Type: AWS::Serverless::StateMachine
    Properties:
      Name: BadStateMachine
      Logging:
        Level: "OFF"
"#,
                ],
                "Add `Logging` with a `Level` other than `OFF`.",
            ),
            severity: Severity::Medium,
        },
        |state| {
            let mut findings = Findings::new();
            for machine in &state.aws.sam.state_machines {
                if machine.logging_configuration.logging_enabled.is_false() {
                    findings.add("Logging is not enabled.", &machine.logging_configuration.logging_enabled);
                }
            }
            findings
        },
    )
}

#[must_use]
pub fn enable_table_encryption() -> Rule {
    Rule::new(
        RuleDefinition {
            avd_id: "AVD-AWS-0121",
            provider: Provider::Aws,
            service: "sam",
            short_code: "enable-table-encryption",
            summary: "SAM Simple table must have server side encryption enabled.",
            impact: "Data stored in the table that is unencrypted may be vulnerable to compromise",
            resolution: "Enable encryption at rest for SAM Simple Table",
            explanation: "Encryption should be enabled at all available levels to ensure that data is protected if \
                compromised.",
            links: &["https://docs.aws.amazon.com/serverless-application-model/latest/developerguide/sam-resource-simpletable.html#sam-simpletable-ssespecification"],
            terraform: None,
            cloudformation: examples(
                &[r"
Resources:
  GoodExample:
    Type: AWS::Serverless::SimpleTable
    Properties:
      TableName: GoodTable
      SSESpecification:
        SSEEnabled: true
"],
                &[
                    r"
Resources:
  BadExample:
    Type: AWS::Serverless::SimpleTable
    Properties:
      TableName: Bad Table
",
                    r"
Resources:
  BadExample:
    Type: AWS::Serverless::SimpleTable
    Properties:
      TableName: Bad Table
      SSESpecification:
        SSEEnabled: false
",
                ],
                "Set `SSESpecification.SSEEnabled: true`.",
            ),
            severity: Severity::High,
        },
        |state| {
            let mut findings = Findings::new();
            for table in &state.aws.sam.simple_tables {
                if table.sse_specification.enabled.is_false() {
                    findings.add(
                        "Domain for SAM simple table does not have at rest encryption enabled.",
                        &table.sse_specification.enabled,
                    );
                }
            }
            findings
        },
    )
}

#[must_use]
pub fn enable_function_tracing() -> Rule {
    Rule::new(
        RuleDefinition {
            avd_id: "AVD-AWS-0125",
            provider: Provider::Aws,
            service: "sam",
            short_code: "enable-function-tracing",
            summary: "SAM Functions should have X-Ray tracing enabled",
            impact: "Without full tracing enabled it is difficult to trace the flow of logs",
            resolution: "Enable tracing",
            explanation: "X-Ray tracing enables end-to-end debugging and analysis of all function activity. This \
                will allow for identifying bottlenecks, slow downs and timeouts.",
            links: &["https://docs.aws.amazon.com/serverless-application-model/latest/developerguide/sam-resource-function.html#sam-function-tracing"],
            terraform: None,
            cloudformation: examples(
                &[r"
Resources:
  GoodExample:
    Type: AWS::Serverless::Function
    Properties:
      Handler: index.handler
      Runtime: nodejs18.x
      Tracing: Active
"],
                &[
                    r"
Resources:
  BadExample:
    Type: AWS::Serverless::Function
    Properties:
      Handler: index.handler
      Runtime: nodejs18.x
",
                    r"
Resources:
  BadExample:
    Type: AWS::Serverless::Function
    Properties:
      Handler: index.handler
      Tracing: PassThrough
",
                ],
                "Set `Tracing: Active`.",
            ),
            severity: Severity::Low,
        },
        |state| {
            let mut findings = Findings::new();
            for function in &state.aws.sam.functions {
                if function.tracing.is_resolvable() && !function.tracing.equal_to("Active") {
                    findings.add("X-Ray tracing is not enabled.", &function.tracing);
                }
            }
            findings
        },
    )
}
