//! Every built-in rule against its own documentation examples.
//!
//! Bad examples must produce at least one finding from the rule, good
//! examples none.

use rampart::parser::{CloudFormationParser, HclParser, Parser};
use rampart::providers::State;
use rampart::rules::{builtin_rules, Rule};
use rampart::adapters;
use std::path::Path;

fn terraform_state(source: &str) -> State {
    let document = HclParser::new()
        .parse_content(source, Path::new("main.tf"))
        .unwrap_or_else(|e| panic!("example does not parse: {e}\n{source}"));
    adapters::terraform::adapt(&[document])
}

fn cloudformation_state(source: &str) -> State {
    let document = CloudFormationParser::new()
        .parse_content(source, Path::new("template.yaml"))
        .unwrap_or_else(|e| panic!("example does not parse: {e}\n{source}"));
    adapters::cloudformation::adapt(&document)
}

fn check_examples(rule: &Rule, good: &[&str], bad: &[&str], state: fn(&str) -> State) {
    let id = rule.avd_id();
    for example in bad {
        let findings = rule.check(&state(example));
        assert!(!findings.is_empty(), "{id} stayed silent on a bad example:\n{example}");
    }
    for example in good {
        let findings = rule.check(&state(example));
        assert!(findings.is_empty(), "{id} fired {} times on a good example:\n{example}", findings.len());
    }
}

#[test]
fn test_terraform_examples() {
    let mut checked = 0;
    for rule in builtin_rules() {
        if let Some(terraform) = &rule.definition().terraform {
            check_examples(&rule, terraform.good_examples, terraform.bad_examples, terraform_state);
            checked += 1;
        }
    }
    assert!(checked >= 14);
}

#[test]
fn test_cloudformation_examples() {
    let mut checked = 0;
    for rule in builtin_rules() {
        if let Some(cloudformation) = &rule.definition().cloudformation {
            check_examples(
                &rule,
                cloudformation.good_examples,
                cloudformation.bad_examples,
                cloudformation_state,
            );
            checked += 1;
        }
    }
    assert!(checked >= 10);
}

#[test]
fn test_every_rule_has_a_bad_example() {
    for rule in builtin_rules() {
        let definition = rule.definition();
        let bad = definition.terraform.iter().chain(&definition.cloudformation).map(|m| m.bad_examples.len()).sum::<usize>();
        assert!(bad > 0, "{} has no bad example", definition.avd_id);
    }
}
