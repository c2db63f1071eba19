//! Security rules and the engine that runs them.
//!
//! A [`Rule`] pairs a static [`RuleDefinition`] with a check function over
//! the adapted [`State`]. Rules are collected in an explicit [`Registry`]
//! and executed by the [`Engine`].
//!
//! # Example
//!
//! ```rust,ignore
//! use rampart::rules::{Engine, EvaluationOptions, Registry};
//!
//! let registry = Registry::with_builtin_rules()?;
//! let evaluation = Engine::new(EvaluationOptions::default()).evaluate(&registry, &state);
//! for finding in &evaluation.findings {
//!     println!("{}: {}", finding.rule.avd_id, finding.message);
//! }
//! ```

pub mod aws;
mod cidr;
mod engine;
mod finding;
pub mod openstack;
mod registry;

pub use cidr::is_public_cidr;
pub use engine::{CancellationToken, Engine, Evaluation, EvaluationOptions};
pub(crate) use engine::panic_message;
pub use finding::{Finding, Findings, Location};
pub use registry::{Registry, RuleHandle, RuleSelection};

use crate::providers::State;
use crate::types::{Provider, Severity};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Documentation attached to a rule for one input format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineMetadata {
    pub good_examples: &'static [&'static str],
    pub bad_examples: &'static [&'static str],
    pub links: &'static [&'static str],
    pub remediation_markdown: &'static str,
}

/// Static description of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleDefinition {
    /// Globally unique identifier, e.g. `AVD-AWS-0081`
    pub avd_id: &'static str,
    pub provider: Provider,
    pub service: &'static str,
    pub short_code: &'static str,
    pub summary: &'static str,
    pub impact: &'static str,
    pub resolution: &'static str,
    pub explanation: &'static str,
    pub links: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terraform: Option<EngineMetadata>,
    #[serde(rename = "cloudformation", skip_serializing_if = "Option::is_none")]
    pub cloudformation: Option<EngineMetadata>,
    pub severity: Severity,
}

impl RuleDefinition {
    /// `provider-service-short_code`, e.g. `aws-rds-no-classic-resources`.
    #[must_use]
    pub fn long_id(&self) -> String {
        format!("{}-{}-{}", self.provider, self.service, self.short_code)
    }

    /// Whether `id` names this rule by AVD id or long id, ignoring case.
    #[must_use]
    pub fn matches_id(&self, id: &str) -> bool {
        self.avd_id.eq_ignore_ascii_case(id) || self.long_id().eq_ignore_ascii_case(id)
    }
}

impl fmt::Display for RuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.avd_id, self.long_id())
    }
}

/// A rule's check over the whole state.
pub type CheckFn = Arc<dyn Fn(&State) -> Findings + Send + Sync>;

/// A definition with its check function.
#[derive(Clone)]
pub struct Rule {
    definition: Arc<RuleDefinition>,
    check: CheckFn,
}

impl Rule {
    pub fn new(definition: RuleDefinition, check: impl Fn(&State) -> Findings + Send + Sync + 'static) -> Self {
        Self {
            definition: Arc::new(definition),
            check: Arc::new(check),
        }
    }

    #[must_use]
    pub fn definition(&self) -> &Arc<RuleDefinition> {
        &self.definition
    }

    #[must_use]
    pub fn avd_id(&self) -> &'static str {
        self.definition.avd_id
    }

    /// Run the check. Panics in the check function propagate to the caller.
    #[must_use]
    pub fn check(&self, state: &State) -> Findings {
        (self.check)(state)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("definition", &self.definition).finish_non_exhaustive()
    }
}

/// Every built-in rule.
#[must_use]
pub fn builtin_rules() -> Vec<Rule> {
    let mut rules = aws::rules();
    rules.extend(openstack::rules());
    rules
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_long_id() {
        let rules = builtin_rules();
        let classic = rules
            .iter()
            .find(|rule| rule.avd_id() == "AVD-AWS-0081")
            .unwrap();
        assert_eq!(classic.definition().long_id(), "aws-rds-no-classic-resources");
        assert!(classic.definition().matches_id("avd-aws-0081"));
        assert!(classic.definition().matches_id("aws-rds-no-classic-resources"));
    }

    #[test]
    fn test_builtin_rules_are_unique_and_documented() {
        let rules = builtin_rules();
        assert_eq!(rules.len(), 20);

        let ids: HashSet<_> = rules.iter().map(Rule::avd_id).collect();
        assert_eq!(ids.len(), rules.len());

        for rule in &rules {
            let definition = rule.definition();
            assert!(!definition.summary.is_empty(), "{definition} has no summary");
            assert!(
                definition.terraform.is_some() || definition.cloudformation.is_some(),
                "{definition} has no examples"
            );
        }
    }
}
