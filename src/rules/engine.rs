//! Rule evaluation.
//!
//! Selected rules run on a bounded rayon pool against a shared `&State`.
//! Each check runs under `catch_unwind`, so a panicking rule becomes a
//! diagnostic instead of aborting the scan. Before each rule the engine
//! checks the deadline and the cancellation token; rules that never start
//! are reported once as a `Cancelled` diagnostic. Results are collected in
//! registry order whatever order the rules complete in.

use super::{Finding, Registry, Rule, RuleSelection};
use crate::config::Config;
use crate::providers::State;
use crate::types::{Diagnostic, DiagnosticKind, Severity};
use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared flag to stop an evaluation early.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How an evaluation runs.
#[derive(Debug, Clone, Default)]
pub struct EvaluationOptions {
    /// Worker threads, 0 for available parallelism
    pub threads: usize,
    /// Overall time budget
    pub timeout: Option<Duration>,
    pub selection: RuleSelection,
    pub cancellation: CancellationToken,
}

impl EvaluationOptions {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            threads: config.engine.threads,
            timeout: config.timeout(),
            selection: RuleSelection::from_options(&config.rules),
            cancellation: CancellationToken::new(),
        }
    }
}

/// Output of one evaluation pass.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    pub findings: Vec<Finding>,
    pub diagnostics: Vec<Diagnostic>,
    /// Whether some selected rules never ran
    pub cancelled: bool,
    /// Rules that ran to completion
    pub rules_evaluated: usize,
}

enum Outcome {
    Completed(Vec<Finding>),
    Panicked(String),
    Skipped,
}

/// Runs registered rules against a state.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    options: EvaluationOptions,
}

impl Engine {
    #[must_use]
    pub fn new(options: EvaluationOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(EvaluationOptions::from_config(config))
    }

    /// Token that stops this engine's evaluations when cancelled.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.options.cancellation.clone()
    }

    /// Run every selected rule against `state`.
    #[must_use]
    pub fn evaluate(&self, registry: &Registry, state: &State) -> Evaluation {
        let selected: Vec<(&Rule, Severity)> = registry
            .rules()
            .filter(|rule| self.options.selection.is_selected(rule.definition()))
            .map(|rule| (rule, self.options.selection.severity(rule.definition())))
            .collect();
        let deadline = self.options.timeout.map(|timeout| Instant::now() + timeout);

        tracing::debug!(
            registered = registry.len(),
            selected = selected.len(),
            threads = self.options.threads,
            "Evaluating rules"
        );

        let run = || {
            selected
                .par_iter()
                .map(|(rule, severity)| self.run_rule(rule, *severity, state, deadline))
                .collect::<Vec<_>>()
        };
        let outcomes = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.threads)
            .thread_name(|index| format!("rampart-rule-{index}"))
            .build()
        {
            Ok(pool) => pool.install(run),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build rule thread pool, using the global pool");
                run()
            }
        };

        let mut evaluation = Evaluation::default();
        let mut skipped = Vec::new();
        for ((rule, _), outcome) in selected.iter().zip(outcomes) {
            match outcome {
                Outcome::Completed(findings) => {
                    evaluation.rules_evaluated += 1;
                    evaluation.findings.extend(findings);
                }
                Outcome::Panicked(message) => {
                    tracing::error!(rule = rule.avd_id(), message = %message, "Rule check panicked");
                    evaluation.diagnostics.push(
                        Diagnostic::new(DiagnosticKind::RuleExecution, format!("check panicked: {message}"))
                            .with_rule(rule.avd_id()),
                    );
                }
                Outcome::Skipped => skipped.push(rule.avd_id()),
            }
        }

        if !skipped.is_empty() {
            let reason = if self.options.cancellation.is_cancelled() {
                "evaluation cancelled"
            } else {
                "evaluation timed out"
            };
            tracing::warn!(skipped = skipped.len(), reason, "Rules skipped");
            evaluation.diagnostics.push(Diagnostic::new(
                DiagnosticKind::Cancelled,
                format!("{reason}, {} rules skipped: {}", skipped.len(), skipped.join(", ")),
            ));
            evaluation.cancelled = true;
        }

        tracing::info!(
            rules = evaluation.rules_evaluated,
            findings = evaluation.findings.len(),
            cancelled = evaluation.cancelled,
            "Evaluation complete"
        );
        evaluation
    }

    fn run_rule(&self, rule: &Rule, severity: Severity, state: &State, deadline: Option<Instant>) -> Outcome {
        if self.options.cancellation.is_cancelled() || deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Outcome::Skipped;
        }

        let started = Instant::now();
        match panic::catch_unwind(AssertUnwindSafe(|| rule.check(state))) {
            Ok(findings) => {
                tracing::trace!(
                    rule = rule.avd_id(),
                    findings = findings.len(),
                    elapsed_us = started.elapsed().as_micros(),
                    "Rule complete"
                );
                Outcome::Completed(findings.into_findings(rule.definition(), severity))
            }
            Err(payload) => Outcome::Panicked(panic_message(payload.as_ref())),
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
