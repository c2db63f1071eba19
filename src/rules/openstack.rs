//! OpenStack rules. These only apply to Terraform.

use super::{is_public_cidr, EngineMetadata, Findings, Rule, RuleDefinition};
use crate::provenance::StringValue;
use crate::types::{Provider, Severity};

#[must_use]
pub fn rules() -> Vec<Rule> {
    vec![
        no_plaintext_password(),
        no_public_access(),
        no_public_ingress(),
        no_public_egress(),
        describe_security_group(),
    ]
}

fn is_public(cidr: &StringValue) -> bool {
    cidr.is_resolvable() && is_public_cidr(cidr.as_str())
}

#[must_use]
pub fn no_plaintext_password() -> Rule {
    Rule::new(
        RuleDefinition {
            avd_id: "AVD-OPNSTK-0001",
            provider: Provider::OpenStack,
            service: "compute",
            short_code: "no-plaintext-password",
            summary: "No plaintext password for compute instance",
            impact: "Including a plaintext password could lead to compromised instance",
            resolution: "Do not use plaintext passwords in terraform files",
            explanation: "Assigning a password to the compute instance using plaintext could lead to compromise; \
                it would be preferable to use key-pairs as a login mechanism",
            links: &[],
            terraform: Some(EngineMetadata {
                good_examples: &[r#"
resource "openstack_compute_instance_v2" "good_example" {
  name            = "basic"
  image_id        = "ad091b52-742f-469e-8f3c-fd81cadf0743"
  flavor_id       = "3"
  key_pair        = "my_key_pair_name"
  security_groups = ["default"]
}
"#],
                bad_examples: &[r#"
resource "openstack_compute_instance_v2" "bad_example" {
  name            = "basic"
  image_id        = "ad091b52-742f-469e-8f3c-fd81cadf0743"
  flavor_id       = "3"
  admin_pass      = "N0tSoS3cretP4ssw0rd"
  security_groups = ["default"]
}
"#],
                links: &["https://registry.terraform.io/providers/terraform-provider-openstack/openstack/latest/docs/resources/compute_instance_v2#admin_pass"],
                remediation_markdown: "Remove `admin_pass` and log in with a key pair.",
            }),
            cloudformation: None,
            severity: Severity::Medium,
        },
        |state| {
            let mut findings = Findings::new();
            for instance in &state.openstack.compute.instances {
                if instance.admin_password.is_not_empty() {
                    findings.add("Instance has admin password set.", &instance.admin_password);
                }
            }
            findings
        },
    )
}

#[must_use]
pub fn no_public_access() -> Rule {
    Rule::new(
        RuleDefinition {
            avd_id: "AVD-OPNSTK-0002",
            provider: Provider::OpenStack,
            service: "compute",
            short_code: "no-public-access",
            summary: "A firewall rule allows traffic from/to the public internet",
            impact: "Exposure of infrastructure to the public internet",
            resolution: "Employ more restrictive firewall rules",
            explanation: "Opening up ports to the public internet is generally to be avoided. You should restrict \
                access to IP addresses or ranges that explicitly require it where possible.",
            links: &[],
            terraform: Some(EngineMetadata {
                good_examples: &[r#"
resource "openstack_fw_rule_v1" "rule_1" {
  name                   = "my_rule"
  description            = "let ssh through from the bastion"
  action                 = "allow"
  protocol               = "tcp"
  destination_port       = "22"
  destination_ip_address = "10.10.10.1"
  source_ip_address      = "10.10.10.2"
  enabled                = "true"
}
"#],
                bad_examples: &[
                    r#"
resource "openstack_fw_rule_v1" "rule_1" {
  name             = "my_rule"
  description      = "let anyone in"
  action           = "allow"
  protocol         = "tcp"
  destination_port = "22"
  enabled          = "true"
}
"#,
                    r#"
resource "openstack_fw_rule_v1" "rule_1" {
  action                 = "allow"
  destination_ip_address = "10.10.10.1"
  source_ip_address      = "0.0.0.0/0"
}
"#,
                ],
                links: &["https://registry.terraform.io/providers/terraform-provider-openstack/openstack/latest/docs/resources/fw_rule_v1"],
                remediation_markdown: "Set private `source_ip_address` and `destination_ip_address` values.",
            }),
            cloudformation: None,
            severity: Severity::Medium,
        },
        |state| {
            let mut findings = Findings::new();
            for rule in &state.openstack.compute.firewall.allow_rules {
                if rule.enabled.is_false() {
                    continue;
                }
                if rule.destination.is_empty() {
                    findings.add("Firewall rule does not restrict destination address internally.", &rule.destination);
                } else if is_public(&rule.destination) {
                    findings.add("Firewall rule allows public egress.", &rule.destination);
                } else if rule.source.is_empty() {
                    findings.add("Firewall rule does not restrict source address internally.", &rule.source);
                } else if is_public(&rule.source) {
                    findings.add("Firewall rule allows public ingress.", &rule.source);
                }
            }
            findings
        },
    )
}

#[must_use]
pub fn no_public_ingress() -> Rule {
    Rule::new(
        RuleDefinition {
            avd_id: "AVD-OPNSTK-0003",
            provider: Provider::OpenStack,
            service: "networking",
            short_code: "no-public-ingress",
            summary: "A security group rule allows ingress traffic from multiple public addresses",
            impact: "Exposure of infrastructure to the public internet",
            resolution: "Employ more restrictive security group rules",
            explanation: "Opening up ports to the public internet is generally to be avoided. You should restrict \
                access to IP addresses or ranges that explicitly require it where possible.",
            links: &["https://registry.terraform.io/providers/terraform-provider-openstack/openstack/latest/docs/resources/networking_secgroup_rule_v2"],
            terraform: Some(EngineMetadata {
                good_examples: &[r#"
resource "openstack_networking_secgroup_rule_v2" "rule_1" {
  direction        = "ingress"
  ethertype        = "IPv4"
  protocol         = "tcp"
  port_range_min   = 22
  port_range_max   = 22
  remote_ip_prefix = "1.2.3.4/32"
}
"#],
                bad_examples: &[r#"
resource "openstack_networking_secgroup_rule_v2" "rule_1" {
  direction        = "ingress"
  ethertype        = "IPv4"
  protocol         = "tcp"
  port_range_min   = 22
  port_range_max   = 22
  remote_ip_prefix = "0.0.0.0/0"
}
"#],
                links: &[],
                remediation_markdown: "Narrow `remote_ip_prefix` to the addresses that need access.",
            }),
            cloudformation: None,
            severity: Severity::Medium,
        },
        |state| {
            let mut findings = Findings::new();
            for group in &state.openstack.networking.security_groups {
                for rule in &group.rules {
                    if rule.is_ingress.is_true() && is_public(&rule.cidr) {
                        findings.add(
                            "Security group rule allows ingress from multiple public addresses.",
                            &rule.cidr,
                        );
                    }
                }
            }
            findings
        },
    )
}

#[must_use]
pub fn no_public_egress() -> Rule {
    Rule::new(
        RuleDefinition {
            avd_id: "AVD-OPNSTK-0004",
            provider: Provider::OpenStack,
            service: "networking",
            short_code: "no-public-egress",
            summary: "A security group rule allows egress traffic to multiple public addresses",
            impact: "Potential exfiltration of data to the public internet",
            resolution: "Employ more restrictive security group rules",
            explanation: "Opening up ports to the public internet is generally to be avoided. You should restrict \
                access to IP addresses or ranges that explicitly require it where possible.",
            links: &["https://registry.terraform.io/providers/terraform-provider-openstack/openstack/latest/docs/resources/networking_secgroup_rule_v2"],
            terraform: Some(EngineMetadata {
                good_examples: &[r#"
resource "openstack_networking_secgroup_rule_v2" "rule_1" {
  direction        = "egress"
  ethertype        = "IPv4"
  protocol         = "tcp"
  port_range_min   = 22
  port_range_max   = 22
  remote_ip_prefix = "1.2.3.4/32"
}
"#],
                bad_examples: &[r#"
resource "openstack_networking_secgroup_rule_v2" "rule_1" {
  direction        = "egress"
  ethertype        = "IPv4"
  protocol         = "tcp"
  port_range_min   = 22
  port_range_max   = 22
  remote_ip_prefix = "0.0.0.0/0"
}
"#],
                links: &[],
                remediation_markdown: "Narrow `remote_ip_prefix` to the addresses that need to be reached.",
            }),
            cloudformation: None,
            severity: Severity::Medium,
        },
        |state| {
            let mut findings = Findings::new();
            for group in &state.openstack.networking.security_groups {
                for rule in &group.rules {
                    if rule.is_ingress.is_false() && is_public(&rule.cidr) {
                        findings.add("Security group rule allows egress to multiple public addresses.", &rule.cidr);
                    }
                }
            }
            findings
        },
    )
}

#[must_use]
pub fn describe_security_group() -> Rule {
    Rule::new(
        RuleDefinition {
            avd_id: "AVD-OPNSTK-0005",
            provider: Provider::OpenStack,
            service: "networking",
            short_code: "describe-security-group",
            summary: "Missing description for security group.",
            impact: "Auditing capability and awareness limited.",
            resolution: "Add descriptions for all security groups",
            explanation: "Security groups should include a description for auditing purposes. Simplifies auditing, \
                debugging, and managing security groups.",
            links: &[],
            terraform: Some(EngineMetadata {
                good_examples: &[r#"
resource "openstack_networking_secgroup_v2" "group_1" {
  name        = "group_1"
  description = "don't let just anyone in"
}
"#],
                bad_examples: &[r#"
resource "openstack_networking_secgroup_v2" "group_1" {
  name = "group_1"
}
"#],
                links: &["https://registry.terraform.io/providers/terraform-provider-openstack/openstack/latest/docs/resources/networking_secgroup_v2"],
                remediation_markdown: "Add a `description` to the security group.",
            }),
            cloudformation: None,
            severity: Severity::Medium,
        },
        |state| {
            let mut findings = Findings::new();
            for group in &state.openstack.networking.security_groups {
                if !group.metadata.is_managed() {
                    continue;
                }
                if group.description.is_empty() {
                    findings.add("Network security group does not have a description.", &group.description);
                }
            }
            findings
        },
    )
}
