//! # Rampart
//!
//! A security misconfiguration scanner for infrastructure as code.
//!
//! Rampart parses Terraform/OpenTofu modules and CloudFormation/SAM
//! templates into a generic document tree, adapts the documents into a
//! typed, provider-specific state, and runs a registry of security rules
//! against that state. Every finding points back to the file and lines of
//! the declaration responsible.
//!
//! ## Features
//!
//! - **Two front-ends**: HCL modules and YAML/JSON templates share one
//!   document model
//! - **Provenance**: every adapted value knows where it came from, or that
//!   it is a default located at its parent
//! - **Rule registry**: rules are plain functions over the state, selected
//!   and re-ranked through configuration
//! - **Isolation**: a panicking adapter or rule becomes a diagnostic
//! - **Multiple output formats**: JSON and plain text reports
//!
//! ## Example
//!
//! ```rust,no_run
//! use rampart::{Config, ReportFormat, Scanner};
//! use rampart::reporter::Reporter;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let scanner = Scanner::new(config.clone())?;
//!
//!     let result = scanner.scan_path("./infra").await?;
//!
//!     let report = Reporter::new(&config).generate(&result, ReportFormat::Json)?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```

#![warn(clippy::all, rust_2018_idioms)]

pub mod adapters;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod parser;
pub mod provenance;
pub mod providers;
pub mod reporter;
pub mod rules;
pub mod types;

// Re-export commonly used types at crate root
pub use config::Config;
pub use document::Document;
pub use error::{RampartError, Result};
pub use providers::State;
pub use rules::{CancellationToken, Engine, Finding, Registry};
pub use types::{Diagnostic, DiagnosticKind, ReportFormat, ScanResult, Severity, SourceFormat};

use parser::{DocumentParser, ParsedDocuments};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

/// Main scanner orchestrator.
///
/// The `Scanner` is the primary entry point for using Rampart as a library.
/// It discovers and parses files, adapts the documents, and evaluates the
/// registry against the resulting state.
///
/// # Example
///
/// ```rust,no_run
/// use rampart::{Config, Scanner};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let scanner = Scanner::new(Config::default())?;
///
///     let result = scanner.scan_paths(&["./network", "./storage"]).await?;
///
///     println!("Found {} findings", result.findings.len());
///     Ok(())
/// }
/// ```
pub struct Scanner {
    config: Config,
    registry: Arc<Registry>,
    engine: Engine,
}

impl Scanner {
    /// Create a scanner running the built-in rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in rules fail to register.
    pub fn new(config: Config) -> Result<Self> {
        let registry = Registry::with_builtin_rules()?;
        Ok(Self::with_registry(config, registry))
    }

    /// Create a scanner running the rules of `registry`.
    #[must_use]
    pub fn with_registry(config: Config, registry: Registry) -> Self {
        let engine = Engine::from_config(&config);
        Self {
            config,
            registry: Arc::new(registry),
            engine,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Token that stops the evaluation of this scanner's scans.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.engine.cancellation_token()
    }

    /// Scan a single file or directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the path doesn't exist. Malformed files become
    /// diagnostics in the result.
    pub async fn scan_path<P: AsRef<Path>>(&self, path: P) -> Result<ScanResult> {
        self.scan_paths(&[path.as_ref()]).await
    }

    /// Scan multiple files or directories as one unit.
    ///
    /// # Errors
    ///
    /// Returns an error if any path doesn't exist.
    pub async fn scan_paths<P: AsRef<Path>>(&self, paths: &[P]) -> Result<ScanResult> {
        let parser = DocumentParser::new(&self.config);
        let mut parsed = ParsedDocuments::default();

        for path in paths {
            let path = path.as_ref();
            tracing::info!(path = %path.display(), "Scanning path");
            parsed.merge(parser.parse_path(path).await?);
        }

        let ParsedDocuments {
            documents,
            diagnostics,
            files,
        } = parsed;
        let mut result = self.scan_documents(documents);
        let mut all_diagnostics = diagnostics;
        all_diagnostics.append(&mut result.diagnostics);
        result.diagnostics = all_diagnostics;
        result.files_scanned = files;
        Ok(result)
    }

    /// Adapt and evaluate documents that were already parsed.
    #[must_use]
    pub fn scan_documents(&self, documents: Vec<Document>) -> ScanResult {
        let mut diagnostics = Vec::new();
        let files: Vec<_> = documents.iter().map(|d| d.path().to_path_buf()).collect();
        let state = adapt_documents(documents, &mut diagnostics);

        tracing::debug!(
            documents = files.len(),
            resources = state.resource_count(),
            "Adaptation complete"
        );

        let evaluation = self.engine.evaluate(&self.registry, &state);
        diagnostics.extend(evaluation.diagnostics);

        tracing::info!(
            findings = evaluation.findings.len(),
            rules = evaluation.rules_evaluated,
            cancelled = evaluation.cancelled,
            "Scan complete"
        );

        ScanResult {
            findings: evaluation.findings,
            diagnostics,
            files_scanned: files,
            rules_evaluated: evaluation.rules_evaluated,
            cancelled: evaluation.cancelled,
            timestamp: Some(chrono::Utc::now()),
        }
    }
}

/// Run every provider adapter over `documents` and merge their state.
///
/// Terraform modules are adapted together so the adapters see every module
/// of the scan; templates are adapted one by one.
fn adapt_documents(documents: Vec<Document>, diagnostics: &mut Vec<Diagnostic>) -> State {
    let (terraform, templates): (Vec<Document>, Vec<Document>) = documents
        .into_iter()
        .partition(|d| d.format() == SourceFormat::Terraform);

    let mut state = State::default();
    if !terraform.is_empty() {
        state.aws.merge(isolated("terraform/aws", None, diagnostics, || {
            adapters::terraform::aws::adapt(&terraform)
        }));
        state.openstack.merge(isolated("terraform/openstack", None, diagnostics, || {
            adapters::terraform::openstack::adapt(&terraform)
        }));
    }

    for template in &templates {
        state.aws.merge(isolated("cloudformation/aws", Some(template.path()), diagnostics, || {
            adapters::cloudformation::aws::adapt(template)
        }));
    }
    state
}

/// Run one adapter, turning a panic into an `Adaptation` diagnostic and an
/// empty result.
fn isolated<T: Default>(
    adapter: &str,
    file: Option<&Path>,
    diagnostics: &mut Vec<Diagnostic>,
    adapt: impl FnOnce() -> T,
) -> T {
    match panic::catch_unwind(AssertUnwindSafe(adapt)) {
        Ok(adapted) => adapted,
        Err(payload) => {
            let message = rules::panic_message(payload.as_ref());
            tracing::error!(adapter = adapter, error = %message, "Adapter panicked");
            let mut diagnostic =
                Diagnostic::new(DiagnosticKind::Adaptation, format!("{adapter} adapter failed: {message}"));
            if let Some(file) = file {
                diagnostic = diagnostic.with_file(file);
            }
            diagnostics.push(diagnostic);
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{CloudFormationParser, HclParser, Parser};

    fn scanner() -> Scanner {
        Scanner::new(Config::default()).unwrap()
    }

    #[test]
    fn test_scanner_creation() {
        let scanner = scanner();
        assert_eq!(scanner.registry().len(), rules::builtin_rules().len());
    }

    #[test]
    fn test_scan_documents_mixes_formats() {
        let module = HclParser::new()
            .parse_content("resource \"aws_db_security_group\" \"legacy\" {\n  name = \"legacy\"\n}\n", Path::new("main.tf"))
            .unwrap();
        let template = CloudFormationParser::new()
            .parse_content(
                "Resources:\n  Table:\n    Type: AWS::Serverless::SimpleTable\n",
                Path::new("template.yaml"),
            )
            .unwrap();

        let result = scanner().scan_documents(vec![module, template]);
        let ids: Vec<_> = result.findings.iter().map(|f| f.rule.avd_id).collect();
        assert!(ids.contains(&"AVD-AWS-0081"));
        assert!(ids.contains(&"AVD-AWS-0121"));
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.files_scanned.len(), 2);
        assert!(result.timestamp.is_some());
    }

    #[test]
    fn test_adapter_panic_becomes_diagnostic() {
        let mut diagnostics = Vec::new();
        let adapted: State = isolated("broken", Some(Path::new("template.yaml")), &mut diagnostics, || -> State {
            panic!("unexpected shape")
        });

        assert_eq!(adapted, State::default());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::Adaptation);
        assert!(diagnostics[0].message.contains("unexpected shape"));
        assert_eq!(diagnostics[0].file.as_deref(), Some(Path::new("template.yaml")));
    }

    #[tokio::test]
    async fn test_scan_path_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.tf"), "resource {").unwrap();
        std::fs::write(
            dir.path().join("instance.tf"),
            "resource \"openstack_compute_instance_v2\" \"vm\" {\n  admin_pass = \"hunter2\"\n}\n",
        )
        .unwrap();

        let result = scanner().scan_path(dir.path()).await.unwrap();
        assert_eq!(result.diagnostics_of(DiagnosticKind::Parse).len(), 1);
        assert_eq!(result.files_scanned.len(), 1);
        assert!(result.findings.iter().any(|f| f.rule.avd_id == "AVD-OPNSTK-0001"));
    }

    #[test]
    fn test_cancelled_scan_runs_no_rules() {
        let scanner = scanner();
        scanner.cancellation_token().cancel();

        let module = HclParser::new()
            .parse_content("resource \"aws_db_security_group\" \"legacy\" {}\n", Path::new("main.tf"))
            .unwrap();
        let result = scanner.scan_documents(vec![module]);

        assert!(result.cancelled);
        assert!(result.findings.is_empty());
        assert_eq!(result.rules_evaluated, 0);
        assert_eq!(result.diagnostics_of(DiagnosticKind::Cancelled).len(), 1);
    }

    #[tokio::test]
    async fn test_missing_path_is_an_error() {
        let result = scanner().scan_path("/definitely/not/here").await;
        assert!(matches!(result, Err(RampartError::DirectoryNotFound { .. })));
    }
}
