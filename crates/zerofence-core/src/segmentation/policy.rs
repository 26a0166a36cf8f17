//! Segmentation policy types and matching logic.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::zones::SecurityZone;

/// Protocol wildcard: a policy listing `"*"` matches any protocol.
pub const ANY_PROTOCOL: &str = "*";
/// Port wildcard: a policy listing `0` matches any port.
pub const ANY_PORT: u16 = 0;

/// A single zone-pair segmentation policy.
///
/// Immutable once created except for the `enabled` toggle; policies are
/// removed by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkPolicy {
    /// Policy name, used for removal and audit attribution.
    pub name: String,
    /// Zone the flow originates from.
    pub source_zone: SecurityZone,
    /// Zone the flow is destined for.
    pub dest_zone: SecurityZone,
    /// Permitted protocols; `"*"` matches everything.
    pub allowed_protocols: HashSet<String>,
    /// Permitted ports; `0` matches everything.
    pub allowed_ports: HashSet<u16>,
    /// Verdict when this policy wins.
    pub action: PolicyAction,
    /// Higher priority wins among matching policies.
    pub priority: i32,
    /// Disabled policies are skipped during evaluation.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Verdict a policy carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyAction {
    Allow,
    Deny,
}

impl NetworkPolicy {
    /// Build an allow policy for a zone pair.
    pub fn allow(
        name: &str,
        source_zone: SecurityZone,
        dest_zone: SecurityZone,
        protocols: &[&str],
        ports: &[u16],
        priority: i32,
    ) -> Self {
        Self::new(name, source_zone, dest_zone, protocols, ports, PolicyAction::Allow, priority)
    }

    /// Build a deny policy for a zone pair.
    pub fn deny(
        name: &str,
        source_zone: SecurityZone,
        dest_zone: SecurityZone,
        protocols: &[&str],
        ports: &[u16],
        priority: i32,
    ) -> Self {
        Self::new(name, source_zone, dest_zone, protocols, ports, PolicyAction::Deny, priority)
    }

    fn new(
        name: &str,
        source_zone: SecurityZone,
        dest_zone: SecurityZone,
        protocols: &[&str],
        ports: &[u16],
        action: PolicyAction,
        priority: i32,
    ) -> Self {
        Self {
            name: name.to_string(),
            source_zone,
            dest_zone,
            allowed_protocols: protocols.iter().map(|p| p.to_string()).collect(),
            allowed_ports: ports.iter().copied().collect(),
            action,
            priority,
            enabled: true,
        }
    }

    /// Pure match predicate over the query tuple.
    pub fn matches(
        &self,
        src: SecurityZone,
        dst: SecurityZone,
        protocol: &str,
        port: u16,
    ) -> bool {
        self.source_zone == src
            && self.dest_zone == dst
            && (self.allowed_protocols.contains(protocol)
                || self.allowed_protocols.contains(ANY_PROTOCOL))
            && (self.allowed_ports.contains(&port) || self.allowed_ports.contains(&ANY_PORT))
    }

    /// How specifically this policy matched the given flow. An exact
    /// protocol listing beats the `"*"` wildcard and an exact port listing
    /// beats `0`; used to break priority ties deterministically.
    pub fn match_specificity(&self, protocol: &str, port: u16) -> u8 {
        let mut specificity = 0;
        if self.allowed_protocols.contains(protocol) {
            specificity += 1;
        }
        if self.allowed_ports.contains(&port) {
            specificity += 1;
        }
        specificity
    }
}

/// The built-in zero-trust policy set, installed at engine construction.
///
/// Pipeline paths are allowed at priority 100, management access at 90,
/// admin access to management at 95. Lateral movement between the IoT tier
/// zones is denied at 200 and everything leaving quarantine is denied at 300
/// so no later permissive rule can override the isolation.
pub fn default_policies() -> Vec<NetworkPolicy> {
    let mut policies = vec![
        NetworkPolicy::allow(
            "iot_trusted_to_gateway",
            SecurityZone::IotTrusted,
            SecurityZone::CloudGateway,
            &["mqtt", "coap", "https"],
            &[1883, 5683, 8883, 443],
            100,
        ),
        NetworkPolicy::allow(
            "gateway_to_processing",
            SecurityZone::CloudGateway,
            SecurityZone::DataProcessing,
            &["https", "grpc"],
            &[443, 50051],
            100,
        ),
        NetworkPolicy::allow(
            "processing_to_ai",
            SecurityZone::DataProcessing,
            SecurityZone::AiAnalytics,
            &["https", "grpc"],
            &[443, 50051, 8080],
            100,
        ),
        NetworkPolicy::allow(
            "ai_to_processing",
            SecurityZone::AiAnalytics,
            SecurityZone::DataProcessing,
            &["https"],
            &[443],
            100,
        ),
        NetworkPolicy::allow(
            "admin_to_management",
            SecurityZone::Admin,
            SecurityZone::Management,
            &["ssh", "https"],
            &[22, 443],
            95,
        ),
    ];

    // Management reaches every zone except the outside world and quarantine.
    for zone in SecurityZone::ALL {
        if zone == SecurityZone::External || zone == SecurityZone::IotQuarantine {
            continue;
        }
        policies.push(NetworkPolicy::allow(
            &format!("management_to_{zone}"),
            SecurityZone::Management,
            zone,
            &["ssh", "https"],
            &[22, 443],
            90,
        ));
    }

    // Deny IoT-tier lateral movement in both directions.
    for src in [SecurityZone::IotTrusted, SecurityZone::IotUntrusted] {
        for dst in [SecurityZone::IotTrusted, SecurityZone::IotUntrusted] {
            if src != dst {
                policies.push(NetworkPolicy::deny(
                    &format!("deny_{src}_to_{dst}"),
                    src,
                    dst,
                    &[ANY_PROTOCOL],
                    &[ANY_PORT],
                    200,
                ));
            }
        }
    }

    // Quarantine is fully isolated outbound at the highest priority.
    for zone in SecurityZone::ALL {
        if zone != SecurityZone::IotQuarantine {
            policies.push(NetworkPolicy::deny(
                &format!("deny_quarantine_to_{zone}"),
                SecurityZone::IotQuarantine,
                zone,
                &[ANY_PROTOCOL],
                &[ANY_PORT],
                300,
            ));
        }
    }

    policies
}
