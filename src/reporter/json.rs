//! JSON report generator.

use crate::config::Config;
use crate::error::Result;
use crate::reporter::ReportGenerator;
use crate::rules::{Finding, RuleDefinition};
use crate::types::{Diagnostic, ScanResult, Severity};
use serde::Serialize;
use std::collections::BTreeMap;

/// JSON report generator.
pub struct JsonReporter {
    /// Whether to pretty-print the output
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            pretty: config.output.pretty,
        }
    }

    /// Serialize rule definitions with their long ids.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn rules(&self, definitions: &[&RuleDefinition]) -> Result<String> {
        let listing: Vec<JsonRule<'_>> = definitions
            .iter()
            .map(|definition| JsonRule {
                long_id: definition.long_id(),
                definition,
            })
            .collect();
        self.serialize(&listing)
    }

    fn serialize<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };

        json.map_err(|e| crate::err!(ReportGeneration {
            message: format!("Failed to serialize JSON report: {e}"),
        }))
    }
}

impl ReportGenerator for JsonReporter {
    fn generate(&self, result: &ScanResult) -> Result<String> {
        self.serialize(&JsonReport::from(result))
    }
}

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    /// Report metadata
    pub metadata: ReportMetadata,
    /// Summary statistics
    pub summary: ReportSummary,
    /// All findings, in evaluation order
    pub findings: &'a [Finding],
    /// Partial failures
    pub diagnostics: &'a [Diagnostic],
}

impl<'a> From<&'a ScanResult> for JsonReport<'a> {
    fn from(result: &'a ScanResult) -> Self {
        let mut findings_by_severity = BTreeMap::new();
        for finding in &result.findings {
            *findings_by_severity.entry(finding.severity).or_insert(0) += 1;
        }

        Self {
            metadata: ReportMetadata {
                version: env!("CARGO_PKG_VERSION").to_string(),
                timestamp: result.timestamp.unwrap_or_else(chrono::Utc::now).to_rfc3339(),
                files_scanned: result.files_scanned.len(),
                rules_evaluated: result.rules_evaluated,
                cancelled: result.cancelled,
            },
            summary: ReportSummary {
                total_findings: result.findings.len(),
                findings_by_severity,
                has_high_or_above: result.has_findings_at_or_above(Severity::High),
            },
            findings: &result.findings,
            diagnostics: &result.diagnostics,
        }
    }
}

/// Report metadata.
#[derive(Debug, Serialize)]
pub struct ReportMetadata {
    /// Rampart version
    pub version: String,
    /// Scan timestamp
    pub timestamp: String,
    /// Number of files scanned
    pub files_scanned: usize,
    /// Number of rules that ran to completion
    pub rules_evaluated: usize,
    /// Whether the evaluation stopped early
    pub cancelled: bool,
}

/// Report summary.
#[derive(Debug, Serialize)]
pub struct ReportSummary {
    /// Total findings
    pub total_findings: usize,
    /// Findings grouped by severity
    pub findings_by_severity: BTreeMap<Severity, usize>,
    /// Whether any finding is High or Critical
    pub has_high_or_above: bool,
}

#[derive(Serialize)]
struct JsonRule<'a> {
    long_id: String,
    #[serde(flatten)]
    definition: &'a RuleDefinition,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::fixture::scan_result;
    use crate::rules::builtin_rules;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_report_generation() {
        let result = scan_result();
        let reporter = JsonReporter::new(&Config::default());

        let json = reporter.generate(&result).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(parsed["metadata"]["version"].is_string());
        assert_eq!(parsed["metadata"]["files_scanned"], 1);
        assert_eq!(parsed["summary"]["total_findings"], 2);
        assert_eq!(parsed["summary"]["findings_by_severity"]["HIGH"], 1);
        assert_eq!(parsed["summary"]["has_high_or_above"], true);

        let first = &parsed["findings"][0];
        assert_eq!(first["rule_id"], "AVD-TEST-0002");
        assert_eq!(first["severity"], "LOW");
        assert_eq!(first["locations"][0]["file"], "infra/main.tf");
        assert_eq!(first["locations"][0]["start_line"], 10);
        assert_eq!(first["locations"][0]["end_line"], 12);

        assert_eq!(parsed["diagnostics"][0]["kind"], "parse");
        assert_eq!(parsed["diagnostics"][0]["file"], "infra/broken.tf");
    }

    #[test]
    fn test_json_report_compact() {
        let mut config = Config::default();
        config.output.pretty = false;

        let json = JsonReporter::new(&config).generate(&scan_result()).unwrap();
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_rule_listing() {
        let rules = builtin_rules();
        let definitions: Vec<&RuleDefinition> = rules.iter().map(|r| r.definition().as_ref()).collect();

        let json = JsonReporter::new(&Config::default()).rules(&definitions).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let listing = parsed.as_array().unwrap();

        assert_eq!(listing.len(), rules.len());
        let versioning = listing
            .iter()
            .find(|rule| rule["avd_id"] == "AVD-AWS-0090")
            .unwrap();
        assert_eq!(versioning["long_id"], "aws-s3-enable-versioning");
        assert!(versioning["terraform"]["bad_examples"].is_array());
    }
}
