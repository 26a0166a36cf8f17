//! Traffic audit records.
//!
//! Every evaluated flow is recorded as a [`TrafficLogEntry`] — an append-only
//! audit trail for post-hoc analysis. Entries live in the segmentation
//! engine's in-memory log and can additionally be persisted as JSON lines via
//! [`logger::FileAuditLog`].

pub mod logger;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::zones::SecurityZone;

/// A single evaluated flow in the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficLogEntry {
    /// When the flow was evaluated.
    pub timestamp: DateTime<Utc>,
    /// Source device identifier.
    pub src_device: String,
    /// Destination device identifier.
    pub dst_device: String,
    /// Resolved source zone; `None` for a configuration fault.
    pub src_zone: Option<SecurityZone>,
    /// Resolved destination zone; `None` for a configuration fault.
    pub dst_zone: Option<SecurityZone>,
    /// Protocol name as presented by the enforcement point.
    pub protocol: String,
    /// Destination port.
    pub port: u16,
    /// Name of the winning policy, if one matched.
    pub policy: Option<String>,
    /// How the verdict was reached.
    pub outcome: FlowOutcome,
}

/// How a flow verdict was reached.
///
/// `ZoneUnresolved` is a configuration fault, a distinct class from the
/// security denials; `DeniedByDefault` is the zero-trust default when no
/// policy matched, distinct from an explicit deny rule hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowOutcome {
    Allowed,
    DeniedByPolicy,
    DeniedByDefault,
    ZoneUnresolved,
}

impl FlowOutcome {
    /// Whether this outcome permits the flow.
    pub fn allowed(&self) -> bool {
        matches!(self, FlowOutcome::Allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_round_trips_through_json() {
        let entry = TrafficLogEntry {
            timestamp: Utc::now(),
            src_device: "cam_01".to_string(),
            dst_device: "gw".to_string(),
            src_zone: Some(SecurityZone::IotTrusted),
            dst_zone: Some(SecurityZone::CloudGateway),
            protocol: "mqtt".to_string(),
            port: 1883,
            policy: Some("iot_trusted_to_gateway".to_string()),
            outcome: FlowOutcome::Allowed,
        };

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"outcome\":\"allowed\""));
        assert!(json.contains("\"src_zone\":\"iot_trusted\""));

        let parsed: TrafficLogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.policy.as_deref(), Some("iot_trusted_to_gateway"));
        assert!(parsed.outcome.allowed());
    }

    #[test]
    fn unresolved_entry_has_no_zones() {
        let entry = TrafficLogEntry {
            timestamp: Utc::now(),
            src_device: "ghost".to_string(),
            dst_device: "gw".to_string(),
            src_zone: None,
            dst_zone: Some(SecurityZone::CloudGateway),
            protocol: "https".to_string(),
            port: 443,
            policy: None,
            outcome: FlowOutcome::ZoneUnresolved,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"src_zone\":null"));
        assert!(!entry.outcome.allowed());
    }

    #[test]
    fn outcome_allowed_only_for_allowed() {
        assert!(FlowOutcome::Allowed.allowed());
        assert!(!FlowOutcome::DeniedByPolicy.allowed());
        assert!(!FlowOutcome::DeniedByDefault.allowed());
        assert!(!FlowOutcome::ZoneUnresolved.allowed());
    }
}
