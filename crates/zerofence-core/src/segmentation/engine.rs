//! The micro-segmentation engine.
//!
//! Owns the device→zone map and the policy store, and evaluates every flow
//! against them. Evaluation is a pure read over shared state; zone and
//! policy mutations take the corresponding write lock so a concurrent
//! evaluation never observes a half-applied update.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::policy::{default_policies, NetworkPolicy, PolicyAction};
use crate::audit::logger::FileAuditLog;
use crate::audit::{FlowOutcome, TrafficLogEntry};
use crate::config::SegmentationSettings;
use crate::zones::SecurityZone;

/// Monotonic counters, snapshotted for observability scraping.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SegmentationMetrics {
    /// Flows permitted by an allow policy.
    pub packets_allowed: u64,
    /// Flows denied by a policy or by the zero-trust default.
    pub packets_denied: u64,
    /// Flows denied because no policy matched the zone pair.
    pub zone_violations: u64,
    /// Denied flows between the two IoT-tier zones.
    pub lateral_movement_blocked: u64,
    /// Flows denied because a device had no zone assignment.
    pub config_faults: u64,
    /// Devices currently holding a zone assignment.
    pub total_devices: u64,
}

#[derive(Default)]
struct Counters {
    packets_allowed: AtomicU64,
    packets_denied: AtomicU64,
    zone_violations: AtomicU64,
    lateral_movement_blocked: AtomicU64,
    config_faults: AtomicU64,
}

/// The micro-segmentation engine.
pub struct SegmentationEngine {
    device_zones: RwLock<HashMap<String, SecurityZone>>,
    policies: RwLock<Vec<NetworkPolicy>>,
    traffic_log: Mutex<VecDeque<TrafficLogEntry>>,
    traffic_log_capacity: usize,
    audit_sink: Option<Arc<FileAuditLog>>,
    counters: Counters,
}

impl Default for SegmentationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentationEngine {
    /// Create an engine with the built-in zero-trust policy set installed.
    pub fn new() -> Self {
        Self::from_settings(&SegmentationSettings::default())
    }

    /// Create an engine from configuration.
    pub fn from_settings(settings: &SegmentationSettings) -> Self {
        let policies = if settings.install_default_policies {
            default_policies()
        } else {
            Vec::new()
        };
        Self {
            device_zones: RwLock::new(HashMap::new()),
            policies: RwLock::new(policies),
            traffic_log: Mutex::new(VecDeque::new()),
            traffic_log_capacity: settings.traffic_log_capacity.max(1),
            audit_sink: None,
            counters: Counters::default(),
        }
    }

    /// Mirror every traffic log entry to a JSON-lines audit file.
    pub fn with_audit_sink(mut self, sink: Arc<FileAuditLog>) -> Self {
        self.audit_sink = Some(sink);
        self
    }

    // -----------------------------------------------------------------------
    // Zone assignment
    // -----------------------------------------------------------------------

    /// Assign a device to a zone. Idempotent upsert; a prior assignment is
    /// overwritten.
    pub fn assign_device_zone(&self, device_id: &str, zone: SecurityZone) {
        let mut zones = self.device_zones.write().expect("zone map lock poisoned");
        zones.insert(device_id.to_string(), zone);
        info!(device_id, zone = %zone, "device assigned to zone");
    }

    /// Current zone of a device, if assigned.
    pub fn device_zone(&self, device_id: &str) -> Option<SecurityZone> {
        self.device_zones
            .read()
            .expect("zone map lock poisoned")
            .get(device_id)
            .copied()
    }

    /// All devices currently assigned to `zone`.
    pub fn zone_devices(&self, zone: SecurityZone) -> Vec<String> {
        let zones = self.device_zones.read().expect("zone map lock poisoned");
        let mut devices: Vec<String> = zones
            .iter()
            .filter(|(_, z)| **z == zone)
            .map(|(d, _)| d.clone())
            .collect();
        devices.sort();
        devices
    }

    /// Force a device into the quarantine zone, whatever its current zone.
    pub fn quarantine_device(&self, device_id: &str) {
        let mut zones = self.device_zones.write().expect("zone map lock poisoned");
        let previous = zones.insert(device_id.to_string(), SecurityZone::IotQuarantine);
        warn!(
            device_id,
            previous_zone = previous.map(|z| z.as_str()).unwrap_or("unassigned"),
            "device quarantined"
        );
    }

    /// Move a quarantined device back into `target_zone`. No-op unless the
    /// device is currently quarantined.
    pub fn restore_device(&self, device_id: &str, target_zone: SecurityZone) {
        let mut zones = self.device_zones.write().expect("zone map lock poisoned");
        if zones.get(device_id) == Some(&SecurityZone::IotQuarantine) {
            zones.insert(device_id.to_string(), target_zone);
            info!(device_id, zone = %target_zone, "device restored from quarantine");
        }
    }

    // -----------------------------------------------------------------------
    // Policy store
    // -----------------------------------------------------------------------

    /// Add a policy at runtime. Duplicate names are permitted but flagged,
    /// since `remove_policy` removes every policy with the name.
    pub fn add_policy(&self, policy: NetworkPolicy) {
        let mut policies = self.policies.write().expect("policy lock poisoned");
        if policies.iter().any(|p| p.name == policy.name) {
            warn!(name = %policy.name, "adding policy with a duplicate name");
        }
        info!(name = %policy.name, priority = policy.priority, "policy added");
        policies.push(policy);
    }

    /// Remove every policy with the given name. Returns how many were removed.
    pub fn remove_policy(&self, name: &str) -> usize {
        let mut policies = self.policies.write().expect("policy lock poisoned");
        let before = policies.len();
        policies.retain(|p| p.name != name);
        let removed = before - policies.len();
        if removed > 0 {
            info!(name, removed, "policy removed");
        }
        removed
    }

    /// Toggle a policy's `enabled` flag. Returns how many policies changed.
    pub fn set_policy_enabled(&self, name: &str, enabled: bool) -> usize {
        let mut policies = self.policies.write().expect("policy lock poisoned");
        let mut changed = 0;
        for policy in policies.iter_mut().filter(|p| p.name == name) {
            policy.enabled = enabled;
            changed += 1;
        }
        if changed > 0 {
            info!(name, enabled, "policy toggled");
        }
        changed
    }

    /// Snapshot of the current policy set.
    pub fn policies(&self) -> Vec<NetworkPolicy> {
        self.policies.read().expect("policy lock poisoned").clone()
    }

    // -----------------------------------------------------------------------
    // Evaluation
    // -----------------------------------------------------------------------

    /// Evaluate a single flow. Returns `true` if the flow is permitted.
    ///
    /// Fails closed: an unassigned device on either side denies the flow and
    /// is recorded as a configuration fault, not a security denial. Among
    /// matching enabled policies the highest priority wins; ties are broken
    /// by match specificity (exact protocol/port listings beat wildcards)
    /// and then by name, so the verdict never depends on insertion order.
    pub fn evaluate_traffic(
        &self,
        src_device: &str,
        dst_device: &str,
        protocol: &str,
        port: u16,
    ) -> bool {
        let (src_zone, dst_zone) = {
            let zones = self.device_zones.read().expect("zone map lock poisoned");
            (
                zones.get(src_device).copied(),
                zones.get(dst_device).copied(),
            )
        };

        let (Some(src), Some(dst)) = (src_zone, dst_zone) else {
            self.counters.config_faults.fetch_add(1, Ordering::Relaxed);
            warn!(
                src_device,
                dst_device,
                "configuration fault: unresolved zone, failing closed"
            );
            self.record(TrafficLogEntry {
                timestamp: Utc::now(),
                src_device: src_device.to_string(),
                dst_device: dst_device.to_string(),
                src_zone,
                dst_zone,
                protocol: protocol.to_string(),
                port,
                policy: None,
                outcome: FlowOutcome::ZoneUnresolved,
            });
            return false;
        };

        let winner = {
            let policies = self.policies.read().expect("policy lock poisoned");
            policies
                .iter()
                .filter(|p| p.enabled && p.matches(src, dst, protocol, port))
                .max_by(|a, b| {
                    a.priority
                        .cmp(&b.priority)
                        .then_with(|| {
                            a.match_specificity(protocol, port)
                                .cmp(&b.match_specificity(protocol, port))
                        })
                        .then_with(|| b.name.cmp(&a.name))
                })
                .cloned()
        };

        let (allowed, policy_name, outcome) = match &winner {
            Some(policy) => {
                let allowed = policy.action == PolicyAction::Allow;
                let outcome = if allowed {
                    FlowOutcome::Allowed
                } else {
                    FlowOutcome::DeniedByPolicy
                };
                (allowed, Some(policy.name.clone()), outcome)
            }
            None => {
                self.counters.zone_violations.fetch_add(1, Ordering::Relaxed);
                warn!(
                    src_device, dst_device, %src, %dst, protocol, port,
                    "no policy match, default deny"
                );
                (false, None, FlowOutcome::DeniedByDefault)
            }
        };

        if allowed {
            self.counters.packets_allowed.fetch_add(1, Ordering::Relaxed);
            debug!(src_device, dst_device, policy = policy_name.as_deref(), "flow allowed");
        } else {
            self.counters.packets_denied.fetch_add(1, Ordering::Relaxed);
            // Denied IoT-tier traffic is lateral movement, whether the deny
            // came from an explicit rule or the default.
            if src.is_iot_tier() && dst.is_iot_tier() {
                self.counters
                    .lateral_movement_blocked
                    .fetch_add(1, Ordering::Relaxed);
                warn!(src_device, dst_device, "lateral movement blocked");
            }
        }

        self.record(TrafficLogEntry {
            timestamp: Utc::now(),
            src_device: src_device.to_string(),
            dst_device: dst_device.to_string(),
            src_zone: Some(src),
            dst_zone: Some(dst),
            protocol: protocol.to_string(),
            port,
            policy: policy_name,
            outcome,
        });

        allowed
    }

    // -----------------------------------------------------------------------
    // Observability
    // -----------------------------------------------------------------------

    /// Snapshot of the engine counters.
    pub fn metrics(&self) -> SegmentationMetrics {
        SegmentationMetrics {
            packets_allowed: self.counters.packets_allowed.load(Ordering::Relaxed),
            packets_denied: self.counters.packets_denied.load(Ordering::Relaxed),
            zone_violations: self.counters.zone_violations.load(Ordering::Relaxed),
            lateral_movement_blocked: self
                .counters
                .lateral_movement_blocked
                .load(Ordering::Relaxed),
            config_faults: self.counters.config_faults.load(Ordering::Relaxed),
            total_devices: self.device_zones.read().expect("zone map lock poisoned").len() as u64,
        }
    }

    /// Snapshot of the in-memory traffic log, oldest first.
    pub fn traffic_log(&self) -> Vec<TrafficLogEntry> {
        self.traffic_log
            .lock()
            .expect("traffic log lock poisoned")
            .iter()
            .cloned()
            .collect()
    }

    fn record(&self, entry: TrafficLogEntry) {
        if let Some(sink) = &self.audit_sink {
            if let Err(e) = sink.log(&entry) {
                warn!(error = %e, "failed to persist traffic audit entry");
            }
        }
        let mut log = self.traffic_log.lock().expect("traffic log lock poisoned");
        if log.len() == self.traffic_log_capacity {
            log.pop_front();
        }
        log.push_back(entry);
    }
}
