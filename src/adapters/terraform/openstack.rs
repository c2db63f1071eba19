//! OpenStack resources declared with the `terraform-provider-openstack`
//! provider.

use crate::document::{Block, Document};
use crate::provenance::{HasMetadata, Metadata, Value};
use crate::providers::openstack::{
    Compute, Firewall, FirewallRule, Instance, Networking, OpenStack, SecurityGroup, SecurityGroupRule,
};

const SECURITY_GROUP: &str = "openstack_networking_secgroup_v2";

#[must_use]
pub fn adapt(documents: &[Document]) -> OpenStack {
    OpenStack {
        compute: Compute {
            instances: adapt_instances(documents),
            firewall: adapt_firewall(documents),
        },
        networking: Networking {
            security_groups: adapt_security_groups(documents),
        },
    }
}

fn adapt_instances(documents: &[Document]) -> Vec<Instance> {
    documents
        .iter()
        .flat_map(|document| document.resources_of_type("openstack_compute_instance_v2"))
        .map(|block| Instance {
            metadata: block.metadata().clone(),
            admin_password: block.get_string_or_default("admin_pass", ""),
        })
        .collect()
}

fn adapt_firewall(documents: &[Document]) -> Firewall {
    let mut firewall = Firewall::default();

    for block in documents.iter().flat_map(|document| document.resources_of_type("openstack_fw_rule_v1")) {
        let rule = FirewallRule {
            metadata: block.metadata().clone(),
            source: block.get_string_or_default("source_ip_address", ""),
            destination: block.get_string_or_default("destination_ip_address", ""),
            source_port: block.get_string_or_default("source_port", ""),
            destination_port: block.get_string_or_default("destination_port", ""),
            enabled: block.get_bool_or_default("enabled", true),
        };

        let action = block.get_string_or_default("action", "");
        match action.as_str() {
            "allow" => firewall.allow_rules.push(rule),
            "deny" | "reject" => firewall.deny_rules.push(rule),
            other => {
                tracing::debug!(
                    rule = %block.metadata().reference(),
                    action = other,
                    "Skipping firewall rule with unknown action"
                );
            }
        }
    }

    firewall
}

/// Groups in document order, each with the rules that point at it through
/// `security_group_id`. Rules whose group cannot be resolved are collected
/// into a trailing unmanaged group.
fn adapt_security_groups(documents: &[Document]) -> Vec<SecurityGroup> {
    let mut groups = Vec::new();
    let mut orphans = Vec::new();

    for document in documents {
        let blocks = document.resources_of_type(SECURITY_GROUP);
        let first = groups.len();
        groups.extend(blocks.iter().map(|block| SecurityGroup {
            metadata: block.metadata().clone(),
            name: block.get_string_or_default("name", ""),
            description: block.get_string_or_default("description", ""),
            rules: Vec::new(),
        }));

        for block in document.resources_of_type("openstack_networking_secgroup_rule_v2") {
            let rule = adapt_security_group_rule(block);
            let target = block
                .get_attribute("security_group_id")
                .and_then(|attribute| document.resolve_reference(attribute, SECURITY_GROUP))
                .and_then(|target| blocks.iter().position(|group| std::ptr::eq(*group, target)));
            match target {
                Some(index) => groups[first + index].rules.push(rule),
                None => orphans.push(rule),
            }
        }
    }

    if !orphans.is_empty() {
        let metadata = Metadata::unmanaged();
        groups.push(SecurityGroup {
            name: Value::default_from(String::new(), &metadata),
            description: Value::default_from(String::new(), &metadata),
            metadata,
            rules: orphans,
        });
    }

    groups
}

fn adapt_security_group_rule(block: &Block) -> SecurityGroupRule {
    SecurityGroupRule {
        metadata: block.metadata().clone(),
        is_ingress: block
            .get_string_or_default("direction", "")
            .map(|direction| direction.eq_ignore_ascii_case("ingress")),
        ethertype: block
            .get_string_or_default("ethertype", "IPv4")
            .map(|ethertype| if ethertype.eq_ignore_ascii_case("IPv6") { 6 } else { 4 }),
        protocol: block.get_string_or_default("protocol", ""),
        port_min: block.get_int_or_default("port_range_min", 0),
        port_max: block.get_int_or_default("port_range_max", 0),
        cidr: block.get_string_or_default("remote_ip_prefix", ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{HclParser, Parser};
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn adapt_source(source: &str) -> OpenStack {
        let document = HclParser::new().parse_content(source, Path::new("main.tf")).unwrap();
        adapt(&[document])
    }

    #[test]
    fn test_plaintext_password() {
        let adapted = adapt_source(
            r#"
resource "openstack_compute_instance_v2" "my-instance" {
  admin_pass      = "N0tSoS3cretP4ssw0rd"

}"#,
        );

        let instance = &adapted.compute.instances[0];
        assert!(instance.admin_password.equal_to("N0tSoS3cretP4ssw0rd"));
        assert_eq!(instance.admin_password.range().start_line(), 3);
        assert_eq!(instance.admin_password.range().end_line(), 3);
        assert_eq!(
            instance.admin_password.metadata().reference(),
            "openstack_compute_instance_v2.my-instance.admin_pass"
        );
    }

    #[test]
    fn test_omitted_password_uses_block_range() {
        let adapted = adapt_source(
            r#"
resource "openstack_compute_instance_v2" "my-instance" {
}"#,
        );

        let instance = &adapted.compute.instances[0];
        assert!(instance.admin_password.equal_to(""));
        assert!(!instance.admin_password.is_explicit());
        assert_eq!(instance.admin_password.range(), instance.metadata.range());
        assert_eq!(instance.admin_password.range().start_line(), 2);
        assert_eq!(instance.admin_password.range().end_line(), 3);
    }

    #[test]
    fn test_firewall_rule_lines() {
        let adapted = adapt_source(
            r#"
resource "openstack_compute_instance_v2" "my-instance" {
  admin_pass      = "N0tSoS3cretP4ssw0rd"
}

resource "openstack_fw_rule_v1" "rule_1" {
  action                 = "allow"
  protocol               = "tcp"
  destination_port       = "22"
  destination_ip_address = "10.10.10.1"
  source_ip_address      = "10.10.10.2"
  enabled                = "true"
}"#,
        );

        assert_eq!(adapted.compute.instances.len(), 1);
        assert_eq!(adapted.compute.instances[0].admin_password.range().start_line(), 3);

        assert_eq!(adapted.compute.firewall.allow_rules.len(), 1);
        let rule = &adapted.compute.firewall.allow_rules[0];
        let lines = |value: &crate::provenance::StringValue| (value.range().start_line(), value.range().end_line());
        assert_eq!(lines(&rule.destination_port), (9, 9));
        assert_eq!(lines(&rule.destination), (10, 10));
        assert_eq!(lines(&rule.source), (11, 11));
        assert_eq!((rule.enabled.range().start_line(), rule.enabled.range().end_line()), (12, 12));

        assert!(rule.enabled.is_true());
        assert!(rule.destination.equal_to("10.10.10.1"));
        assert!(rule.source.equal_to("10.10.10.2"));
        assert!(rule.destination_port.equal_to("22"));
        assert!(rule.source_port.equal_to(""));
        assert!(!rule.source_port.is_explicit());
    }

    #[test]
    fn test_firewall_actions() {
        let adapted = adapt_source(
            r#"
resource "openstack_fw_rule_v1" "deny" {
  action = "deny"
}

resource "openstack_fw_rule_v1" "odd" {
  action = "log"
}
"#,
        );
        assert!(adapted.compute.firewall.allow_rules.is_empty());
        assert_eq!(adapted.compute.firewall.deny_rules.len(), 1);
        assert!(adapted.compute.firewall.deny_rules[0].enabled.is_true());
    }

    #[test]
    fn test_security_group_rules_attach_by_reference() {
        let adapted = adapt_source(
            r#"
resource "openstack_networking_secgroup_v2" "web" {
  name        = "web"
  description = "web servers"
}

resource "openstack_networking_secgroup_rule_v2" "https" {
  direction         = "ingress"
  ethertype         = "IPv4"
  protocol          = "tcp"
  port_range_min    = 443
  port_range_max    = 443
  remote_ip_prefix  = "0.0.0.0/0"
  security_group_id = openstack_networking_secgroup_v2.web.id
}

resource "openstack_networking_secgroup_rule_v2" "stray" {
  direction         = "egress"
  ethertype         = "IPv6"
  security_group_id = "0b8a5bc0-1f3c-4c1e-9a62-7a5d2f0b7c11"
}
"#,
        );

        let groups = &adapted.networking.security_groups;
        assert_eq!(groups.len(), 2);

        let web = &groups[0];
        assert!(web.name.equal_to("web"));
        assert_eq!(web.rules.len(), 1);
        let rule = &web.rules[0];
        assert!(rule.is_ingress.is_true());
        assert_eq!(rule.is_ingress.range().start_line(), 8);
        assert_eq!(*rule.ethertype.value(), 4);
        assert_eq!(*rule.port_min.value(), 443);
        assert!(rule.cidr.equal_to("0.0.0.0/0"));
        assert_eq!(rule.cidr.range().start_line(), 13);

        let placeholder = &groups[1];
        assert!(!placeholder.metadata.is_managed());
        assert_eq!(placeholder.rules.len(), 1);
        assert!(placeholder.rules[0].is_ingress.is_false());
        assert_eq!(*placeholder.rules[0].ethertype.value(), 6);
    }

    #[test]
    fn test_adaptation_is_idempotent() {
        let source = r#"
resource "openstack_compute_instance_v2" "a" {
  admin_pass = "x"
}

resource "openstack_fw_rule_v1" "r" {
  action = "allow"
}
"#;
        let document = HclParser::new().parse_content(source, Path::new("main.tf")).unwrap();
        assert_eq!(adapt(&[document.clone()]), adapt(&[document]));
    }
}
