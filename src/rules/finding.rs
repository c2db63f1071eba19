//! Findings produced by rule checks.

use super::RuleDefinition;
use crate::provenance::{HasMetadata, Metadata};
use crate::types::Severity;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// Where a finding points.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    pub file: String,
    pub start_line: usize,
    pub end_line: usize,
    /// Logical path of the flagged value, e.g. `aws_s3_bucket.logs.acl`
    pub reference: String,
}

impl From<&Metadata> for Location {
    fn from(metadata: &Metadata) -> Self {
        let range = metadata.range();
        Self {
            file: range.filename().to_string(),
            start_line: range.start_line(),
            end_line: range.end_line(),
            reference: metadata.reference().to_string(),
        }
    }
}

/// One reported violation.
#[derive(Debug, Clone)]
pub struct Finding {
    pub rule: Arc<RuleDefinition>,
    /// Severity after configured overrides
    pub severity: Severity,
    pub message: String,
    /// Provenance of every value responsible, most specific first
    pub flagged: Vec<Metadata>,
}

impl Finding {
    #[must_use]
    pub fn locations(&self) -> Vec<Location> {
        self.flagged.iter().map(Location::from).collect()
    }

    /// The first location, if any.
    #[must_use]
    pub fn primary_location(&self) -> Option<Location> {
        self.flagged.first().map(Location::from)
    }
}

impl Serialize for Finding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Finding", 8)?;
        state.serialize_field("rule_id", self.rule.avd_id)?;
        state.serialize_field("long_id", &self.rule.long_id())?;
        state.serialize_field("provider", &self.rule.provider)?;
        state.serialize_field("service", self.rule.service)?;
        state.serialize_field("severity", &self.severity)?;
        state.serialize_field("message", &self.message)?;
        state.serialize_field("resolution", self.rule.resolution)?;
        state.serialize_field("locations", &self.locations())?;
        state.end()
    }
}

/// Results collected by one check, before the engine attaches the rule.
#[derive(Debug, Clone, Default)]
pub struct Findings {
    entries: Vec<(String, Vec<Metadata>)>,
}

impl Findings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag one value or resource.
    pub fn add(&mut self, message: impl Into<String>, flagged: &impl HasMetadata) {
        self.entries.push((message.into(), vec![flagged.metadata().clone()]));
    }

    /// Flag several values that together cause one violation.
    pub fn add_all(&mut self, message: impl Into<String>, flagged: &[&dyn HasMetadata]) {
        self.entries.push((
            message.into(),
            flagged.iter().map(|item| item.metadata().clone()).collect(),
        ));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attach the rule that produced these results.
    #[must_use]
    pub fn into_findings(self, rule: &Arc<RuleDefinition>, severity: Severity) -> Vec<Finding> {
        self.entries
            .into_iter()
            .map(|(message, flagged)| Finding {
                rule: Arc::clone(rule),
                severity,
                message,
                flagged,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provenance::{Range, StringValue, Value};
    use crate::rules::testing::definition;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_locations_follow_flagged_values() {
        let block = Metadata::new(Range::new("main.tf", 2, 8), "aws_s3_bucket.logs");
        let acl: StringValue = Value::new("public-read".into(), Metadata::new(Range::new("main.tf", 4, 4), "aws_s3_bucket.logs.acl"));

        let mut findings = Findings::new();
        findings.add("Bucket has a public ACL.", &acl);
        findings.add_all("Two values", &[&acl, &block]);
        assert_eq!(findings.len(), 2);

        let rule = Arc::new(definition("AVD-TEST-0001", Severity::High));
        let findings = findings.into_findings(&rule, Severity::Critical);
        assert_eq!(findings[0].severity, Severity::Critical);
        assert_eq!(
            findings[0].locations(),
            vec![Location {
                file: "main.tf".into(),
                start_line: 4,
                end_line: 4,
                reference: "aws_s3_bucket.logs.acl".into(),
            }]
        );
        assert_eq!(findings[1].locations().len(), 2);
        assert_eq!(findings[1].locations()[1].end_line, 8);
    }

    #[test]
    fn test_serialized_shape() {
        let rule = Arc::new(definition("AVD-TEST-0002", Severity::Low));
        let mut findings = Findings::new();
        findings.add("Flagged", &Metadata::new(Range::new("t.yaml", 3, 5), "Resources.X"));
        let finding = &findings.into_findings(&rule, Severity::Low)[0];

        let json = serde_json::to_value(finding).unwrap();
        assert_eq!(json["rule_id"], "AVD-TEST-0002");
        assert_eq!(json["severity"], "LOW");
        assert_eq!(json["locations"][0]["start_line"], 3);
        assert_eq!(json["locations"][0]["end_line"], 5);
    }
}
