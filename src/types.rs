//! Core data types shared across Rampart.
//!
//! This module defines:
//! - Source formats and cloud providers
//! - Severity levels and report formats
//! - Scan results and non-fatal diagnostics

use crate::rules::Finding;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Input formats Rampart understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Terraform / OpenTofu HCL modules
    Terraform,
    /// CloudFormation and SAM templates (YAML or JSON)
    CloudFormation,
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Terraform => write!(f, "terraform"),
            Self::CloudFormation => write!(f, "cloudformation"),
        }
    }
}

/// Cloud providers with adapted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Amazon Web Services
    Aws,
    /// OpenStack
    OpenStack,
}

impl Provider {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::OpenStack => "openstack",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity level for rules and findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Hardening advice
    #[serde(alias = "low")]
    Low,
    /// Weakens the security posture
    #[serde(alias = "medium")]
    Medium,
    /// Likely exploitable misconfiguration
    #[serde(alias = "high")]
    High,
    /// Severe issue requiring immediate attention
    #[serde(alias = "critical")]
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum ReportFormat {
    /// JSON format
    #[default]
    Json,
    /// Plain text format
    Text,
}

/// What kind of partial failure a diagnostic records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A document could not be parsed and was left out of the state
    Parse,
    /// A provider adapter failed; its part of the state is empty
    Adaptation,
    /// A rule's check function panicked
    RuleExecution,
    /// The evaluation was cancelled or timed out before every rule ran
    Cancelled,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse => write!(f, "parse"),
            Self::Adaptation => write!(f, "adaptation"),
            Self::RuleExecution => write!(f, "rule-execution"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A non-fatal problem encountered during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            file: None,
            rule_id: None,
        }
    }

    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = Some(rule_id.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.kind)?;
        if let Some(rule) = &self.rule_id {
            write!(f, " {rule}")?;
        }
        if let Some(file) = &self.file {
            write!(f, " {}", file.display())?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Result of scanning a set of documents.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanResult {
    /// Findings in registry order, then check order
    pub findings: Vec<Finding>,

    /// Partial failures that did not stop the scan
    pub diagnostics: Vec<Diagnostic>,

    /// Files that were parsed successfully
    pub files_scanned: Vec<PathBuf>,

    /// Number of rules that ran to completion
    pub rules_evaluated: usize,

    /// Whether the evaluation stopped early (timeout or cancellation)
    pub cancelled: bool,

    /// Timestamp of the scan
    pub timestamp: Option<DateTime<Utc>>,
}

impl ScanResult {
    /// Check if there are any findings at `severity` or above.
    #[must_use]
    pub fn has_findings_at_or_above(&self, severity: Severity) -> bool {
        self.findings.iter().any(|f| f.severity >= severity)
    }

    /// Get findings filtered by severity.
    #[must_use]
    pub fn findings_by_severity(&self, severity: Severity) -> Vec<&Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .collect()
    }

    /// Diagnostics of one kind.
    #[must_use]
    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.kind == kind).collect()
    }
}
