//! OpenStack.

use crate::impl_has_metadata;
use crate::provenance::{BoolValue, IntValue, Metadata, StringValue};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OpenStack {
    pub compute: Compute,
    pub networking: Networking,
}

impl OpenStack {
    pub fn merge(&mut self, other: Self) {
        self.compute.instances.extend(other.compute.instances);
        self.compute.firewall.allow_rules.extend(other.compute.firewall.allow_rules);
        self.compute.firewall.deny_rules.extend(other.compute.firewall.deny_rules);
        self.networking.security_groups.extend(other.networking.security_groups);
    }

    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.compute.instances.len()
            + self.compute.firewall.allow_rules.len()
            + self.compute.firewall.deny_rules.len()
            + self.networking.security_groups.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Compute {
    pub instances: Vec<Instance>,
    pub firewall: Firewall,
}

/// `openstack_compute_instance_v2`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instance {
    pub metadata: Metadata,
    pub admin_password: StringValue,
}

/// Every `openstack_fw_rule_v1`, split by action. The firewall itself has
/// no block of its own, so its metadata is unmanaged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Firewall {
    pub metadata: Metadata,
    pub allow_rules: Vec<FirewallRule>,
    pub deny_rules: Vec<FirewallRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirewallRule {
    pub metadata: Metadata,
    pub source: StringValue,
    pub destination: StringValue,
    pub source_port: StringValue,
    pub destination_port: StringValue,
    pub enabled: BoolValue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Networking {
    pub security_groups: Vec<SecurityGroup>,
}

/// `openstack_networking_secgroup_v2` with its attached rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityGroup {
    pub metadata: Metadata,
    pub name: StringValue,
    pub description: StringValue,
    pub rules: Vec<SecurityGroupRule>,
}

/// `openstack_networking_secgroup_rule_v2`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityGroupRule {
    pub metadata: Metadata,
    pub is_ingress: BoolValue,
    /// 4 or 6
    pub ethertype: IntValue,
    pub protocol: StringValue,
    pub port_min: IntValue,
    pub port_max: IntValue,
    pub cidr: StringValue,
}

impl_has_metadata!(Instance, Firewall, FirewallRule, SecurityGroup, SecurityGroupRule);
