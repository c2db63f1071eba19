//! Explicit rule registry.

use super::{builtin_rules, Rule, RuleDefinition};
use crate::config::RulesOptions;
use crate::error::{ErrorCollector, Result};
use crate::types::Severity;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Opaque handle returned by [`Registry::register`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleHandle {
    avd_id: &'static str,
}

impl RuleHandle {
    #[must_use]
    pub const fn avd_id(&self) -> &'static str {
        self.avd_id
    }
}

/// Registered rules keyed by AVD id.
///
/// Registration order does not matter: iteration is always in AVD id order.
/// A registry is filled once before evaluation and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    rules: BTreeMap<&'static str, Rule>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in rule.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateRule` if two built-in rules share an identifier.
    pub fn with_builtin_rules() -> Result<Self> {
        let mut registry = Self::new();
        registry.register_all(builtin_rules())?;
        tracing::debug!(rules = registry.len(), "Registered built-in rules");
        Ok(registry)
    }

    /// Add several rules, reporting every rejected one.
    ///
    /// Valid rules are registered even when others fail.
    ///
    /// # Errors
    ///
    /// Returns the single registration error, or `Multiple` when more than
    /// one rule was rejected.
    pub fn register_all(&mut self, rules: impl IntoIterator<Item = Rule>) -> Result<Vec<RuleHandle>> {
        let mut handles = Vec::new();
        let mut errors = ErrorCollector::new();
        for rule in rules {
            match self.register(rule) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    tracing::warn!(error = %e, "Rejected rule");
                    errors.add(e);
                }
            }
        }
        errors.into_result()?;
        Ok(handles)
    }

    /// Add a rule.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateRule` if a rule with the same AVD id is already
    /// registered, or `InvalidRule` if the definition has no AVD id or
    /// short code.
    pub fn register(&mut self, rule: Rule) -> Result<RuleHandle> {
        let definition = rule.definition();
        if definition.avd_id.trim().is_empty() || definition.short_code.trim().is_empty() {
            return Err(crate::err!(InvalidRule {
                id: definition.avd_id.to_string(),
                message: "rules need an AVD id and a short code".to_string(),
            }));
        }
        if self.rules.contains_key(definition.avd_id) {
            return Err(crate::err!(DuplicateRule {
                id: definition.avd_id.to_string(),
            }));
        }

        let avd_id = definition.avd_id;
        self.rules.insert(avd_id, rule);
        Ok(RuleHandle { avd_id })
    }

    #[must_use]
    pub fn get(&self, handle: &RuleHandle) -> Option<&Rule> {
        self.rules.get(handle.avd_id)
    }

    /// Look a rule up by AVD id or long id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Rule> {
        self.rules.values().find(|rule| rule.definition().matches_id(id))
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    pub fn definitions(&self) -> impl Iterator<Item = &Arc<RuleDefinition>> {
        self.rules.values().map(Rule::definition)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Which rules run and at what severity.
///
/// Identifiers may be AVD ids or long ids and are matched ignoring case.
#[derive(Debug, Clone, Default)]
pub struct RuleSelection {
    include: Vec<String>,
    exclude: Vec<String>,
    minimum_severity: Option<Severity>,
    severity_overrides: BTreeMap<String, Severity>,
}

impl RuleSelection {
    /// Run every rule at its declared severity.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_options(options: &RulesOptions) -> Self {
        Self {
            include: options.include.clone(),
            exclude: options.exclude.clone(),
            minimum_severity: options.minimum_severity,
            severity_overrides: options.severity_overrides.clone(),
        }
    }

    /// Severity for a rule, after overrides. An override keyed by AVD id
    /// wins over one keyed by long id.
    #[must_use]
    pub fn severity(&self, definition: &RuleDefinition) -> Severity {
        self.override_for(definition.avd_id)
            .or_else(|| self.override_for(&definition.long_id()))
            .unwrap_or(definition.severity)
    }

    fn override_for(&self, id: &str) -> Option<Severity> {
        self.severity_overrides
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(id))
            .map(|(_, severity)| *severity)
    }

    /// Whether a rule should run.
    #[must_use]
    pub fn is_selected(&self, definition: &RuleDefinition) -> bool {
        if !self.include.is_empty() && !self.include.iter().any(|id| definition.matches_id(id)) {
            return false;
        }
        if self.exclude.iter().any(|id| definition.matches_id(id)) {
            return false;
        }
        self.minimum_severity
            .map_or(true, |minimum| self.severity(definition) >= minimum)
    }

    /// Configured identifiers that match no rule in `registry`.
    #[must_use]
    pub fn unknown_ids<'a>(&'a self, registry: &Registry) -> Vec<&'a str> {
        self.include
            .iter()
            .chain(&self.exclude)
            .chain(self.severity_overrides.keys())
            .filter(|id| registry.find(id).is_none())
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RampartError;
    use crate::rules::testing::definition;
    use crate::rules::Findings;

    fn rule(avd_id: &'static str, severity: Severity) -> Rule {
        Rule::new(definition(avd_id, severity), |_| Findings::new())
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = Registry::new();
        let handle = registry.register(rule("AVD-TEST-0001", Severity::Low)).unwrap();
        assert_eq!(handle.avd_id(), "AVD-TEST-0001");
        assert!(registry.get(&handle).is_some());

        let result = registry.register(rule("AVD-TEST-0001", Severity::High));
        assert!(matches!(result, Err(RampartError::DuplicateRule { ref id, .. }) if id == "AVD-TEST-0001"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.rules().next().unwrap().definition().severity, Severity::Low);
    }

    #[test]
    fn test_register_all_reports_every_rejection() {
        let mut registry = Registry::new();
        let result = registry.register_all([
            rule("AVD-TEST-0001", Severity::Low),
            rule("AVD-TEST-0001", Severity::Low),
            rule("", Severity::Low),
            rule("AVD-TEST-0002", Severity::Low),
        ]);

        assert!(matches!(result, Err(RampartError::Multiple { count: 2, .. })));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_invalid_rule_is_rejected() {
        let mut registry = Registry::new();
        let result = registry.register(rule("", Severity::Low));
        assert!(matches!(result, Err(RampartError::InvalidRule { .. })));
    }

    #[test]
    fn test_order_ignores_registration_order() {
        let mut forward = Registry::new();
        let mut backward = Registry::new();
        let ids = ["AVD-TEST-0003", "AVD-TEST-0001", "AVD-TEST-0002"];
        for id in ids {
            forward.register(rule(id, Severity::Low)).unwrap();
        }
        for id in ids.iter().rev() {
            backward.register(rule(id, Severity::Low)).unwrap();
        }

        let order = |registry: &Registry| registry.rules().map(Rule::avd_id).collect::<Vec<_>>();
        assert_eq!(order(&forward), vec!["AVD-TEST-0001", "AVD-TEST-0002", "AVD-TEST-0003"]);
        assert_eq!(order(&forward), order(&backward));
    }

    #[test]
    fn test_builtin_registry() {
        let registry = Registry::with_builtin_rules().unwrap();
        assert_eq!(registry.len(), 20);
        assert!(registry.find("openstack-compute-no-plaintext-password").is_some());
        assert!(registry.find("AVD-AWS-0081").is_some());
    }

    #[test]
    fn test_selection() {
        let registry = Registry::with_builtin_rules().unwrap();
        let classic = registry.find("AVD-AWS-0081").unwrap().definition();
        let tracing = registry.find("AVD-AWS-0125").unwrap().definition();

        let options = RulesOptions {
            exclude: vec!["aws-rds-no-classic-resources".into()],
            minimum_severity: Some(Severity::Medium),
            severity_overrides: BTreeMap::from([("AVD-AWS-0125".to_string(), Severity::High)]),
            ..RulesOptions::default()
        };
        let selection = RuleSelection::from_options(&options);
        assert!(!selection.is_selected(classic));
        assert!(selection.is_selected(tracing));
        assert_eq!(selection.severity(tracing), Severity::High);

        let only = RuleSelection::from_options(&RulesOptions {
            include: vec!["avd-aws-0081".into(), "no-such-rule".into()],
            ..RulesOptions::default()
        });
        assert!(only.is_selected(classic));
        assert!(!only.is_selected(tracing));
        assert_eq!(only.unknown_ids(&registry), vec!["no-such-rule"]);
    }

    #[test]
    fn test_avd_id_override_wins_over_long_id() {
        let registry = Registry::with_builtin_rules().unwrap();
        let tracing = registry.find("AVD-AWS-0125").unwrap().definition();

        for overrides in [
            [("aws-sam-enable-function-tracing", Severity::Low), ("AVD-AWS-0125", Severity::Critical)],
            [("avd-aws-0125", Severity::Critical), ("AWS-SAM-ENABLE-FUNCTION-TRACING", Severity::Low)],
        ] {
            let selection = RuleSelection::from_options(&RulesOptions {
                severity_overrides: overrides.into_iter().map(|(id, s)| (id.to_string(), s)).collect(),
                ..RulesOptions::default()
            });
            assert_eq!(selection.severity(tracing), Severity::Critical);
        }

        let long_only = RuleSelection::from_options(&RulesOptions {
            severity_overrides: BTreeMap::from([("aws-sam-enable-function-tracing".to_string(), Severity::Low)]),
            ..RulesOptions::default()
        });
        assert_eq!(long_only.severity(tracing), Severity::Low);
    }
}
