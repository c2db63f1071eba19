//! Report generation module.
//!
//! This module provides report generation in multiple formats:
//! - JSON: Machine-readable structured output
//! - Text: Human-readable CLI output
//!
//! Both formats can render a scan result or the list of registered rules.
//!
//! # Example
//!
//! ```rust,no_run
//! use rampart::reporter::Reporter;
//! use rampart::{Config, ReportFormat, ScanResult};
//!
//! let config = Config::default();
//! let reporter = Reporter::new(&config);
//!
//! let json = reporter.generate(&ScanResult::default(), ReportFormat::Json)?;
//! # Ok::<(), rampart::RampartError>(())
//! ```

mod json;
mod text;

use crate::config::Config;
use crate::error::Result;
use crate::rules::RuleDefinition;
use crate::types::{ReportFormat, ScanResult};
use std::sync::Arc;

pub use json::{JsonReport, JsonReporter};
pub use text::TextReporter;

/// Report generator that supports multiple output formats.
pub struct Reporter {
    config: Config,
}

impl Reporter {
    /// Create a new reporter with the given configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Generate a report in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if report generation fails.
    pub fn generate(&self, result: &ScanResult, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => JsonReporter::new(&self.config).generate(result),
            ReportFormat::Text => TextReporter::new(&self.config).generate(result),
        }
    }

    /// Render rule documentation in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn rules<'a>(
        &self,
        definitions: impl IntoIterator<Item = &'a Arc<RuleDefinition>>,
        format: ReportFormat,
    ) -> Result<String> {
        let definitions: Vec<&RuleDefinition> = definitions.into_iter().map(AsRef::as_ref).collect();
        match format {
            ReportFormat::Json => JsonReporter::new(&self.config).rules(&definitions),
            ReportFormat::Text => Ok(TextReporter::new(&self.config).rules(&definitions)),
        }
    }
}

/// Trait for report generators.
pub trait ReportGenerator {
    /// Generate a report from scan results.
    ///
    /// # Errors
    ///
    /// Returns an error if generation fails.
    fn generate(&self, result: &ScanResult) -> Result<String>;
}

#[cfg(test)]
pub(crate) mod fixture {
    use crate::provenance::{Metadata, Range};
    use crate::rules::testing::definition;
    use crate::rules::Finding;
    use crate::types::{Diagnostic, DiagnosticKind, ScanResult, Severity};
    use std::path::PathBuf;
    use std::sync::Arc;

    /// One high and one low finding plus a parse diagnostic.
    pub(crate) fn scan_result() -> ScanResult {
        let finding = |avd_id: &'static str, severity, line| Finding {
            rule: Arc::new(definition(avd_id, severity)),
            severity,
            message: format!("{avd_id} violated."),
            flagged: vec![Metadata::new(Range::new("infra/main.tf", line, line + 2), "aws_s3_bucket.logs")],
        };
        ScanResult {
            findings: vec![
                finding("AVD-TEST-0002", Severity::Low, 10),
                finding("AVD-TEST-0001", Severity::High, 1),
            ],
            diagnostics: vec![Diagnostic::new(DiagnosticKind::Parse, "unexpected token").with_file("infra/broken.tf")],
            files_scanned: vec![PathBuf::from("infra/main.tf")],
            rules_evaluated: 2,
            cancelled: false,
            timestamp: None,
        }
    }
}
