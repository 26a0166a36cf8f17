//! The security zone taxonomy.
//!
//! Zones form a fixed, closed set known at compile time. Every device is
//! assigned to exactly one zone; flows are evaluated against zone pairs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A security zone in the segmented network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityZone {
    /// Untrusted networks outside the perimeter.
    External,
    /// Demilitarized zone for externally reachable services.
    Dmz,
    /// Gateways bridging device traffic into the cloud.
    CloudGateway,
    /// Devices with a verified identity and clean behavioral record.
    IotTrusted,
    /// Devices admitted to the network but not yet vetted.
    IotUntrusted,
    /// Isolation zone for compromised or suspect devices.
    IotQuarantine,
    /// Network and fleet management plane.
    Management,
    /// Ingest and processing backends.
    DataProcessing,
    /// Analytics and detection model infrastructure.
    AiAnalytics,
    /// Administrative operator workstations.
    Admin,
}

impl SecurityZone {
    /// Every zone, in declaration order.
    pub const ALL: [SecurityZone; 10] = [
        SecurityZone::External,
        SecurityZone::Dmz,
        SecurityZone::CloudGateway,
        SecurityZone::IotTrusted,
        SecurityZone::IotUntrusted,
        SecurityZone::IotQuarantine,
        SecurityZone::Management,
        SecurityZone::DataProcessing,
        SecurityZone::AiAnalytics,
        SecurityZone::Admin,
    ];

    /// Stable wire name of the zone.
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityZone::External => "external",
            SecurityZone::Dmz => "dmz",
            SecurityZone::CloudGateway => "cloud_gateway",
            SecurityZone::IotTrusted => "iot_trusted",
            SecurityZone::IotUntrusted => "iot_untrusted",
            SecurityZone::IotQuarantine => "iot_quarantine",
            SecurityZone::Management => "management",
            SecurityZone::DataProcessing => "data_processing",
            SecurityZone::AiAnalytics => "ai_analytics",
            SecurityZone::Admin => "admin",
        }
    }

    /// Whether this zone is part of the IoT device tier. Denied traffic
    /// between two tier zones counts as blocked lateral movement.
    pub fn is_iot_tier(&self) -> bool {
        matches!(self, SecurityZone::IotTrusted | SecurityZone::IotUntrusted)
    }
}

impl fmt::Display for SecurityZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
