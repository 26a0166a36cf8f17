//! Engine settings and TOML configuration parsing.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level engine configuration, loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZerofenceConfig {
    /// Authenticator tuning.
    #[serde(default)]
    pub auth: AuthSettings,

    /// Segmentation engine tuning.
    #[serde(default)]
    pub segmentation: SegmentationSettings,

    /// Traffic audit persistence.
    #[serde(default)]
    pub audit: AuditSettings,
}

impl ZerofenceConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }
}

/// Authenticator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Lifetime of issued tokens in seconds.
    #[serde(default = "default_token_lifetime_secs")]
    pub token_lifetime_secs: u64,

    /// Minimum trust score for a device to be considered trusted.
    #[serde(default = "default_trust_threshold")]
    pub trust_threshold: f64,

    /// Linear trust decay applied per elapsed minute since authentication.
    #[serde(default = "default_trust_decay_per_min")]
    pub trust_decay_per_min: f64,

    /// Trust penalty applied when a behavior signal crosses the anomaly threshold.
    #[serde(default = "default_anomaly_penalty")]
    pub anomaly_penalty: f64,

    /// Anomaly score above which a behavior signal is treated as anomalous.
    #[serde(default = "default_anomaly_threshold")]
    pub anomaly_threshold: f64,
}

fn default_token_lifetime_secs() -> u64 {
    300
}

fn default_trust_threshold() -> f64 {
    70.0
}

fn default_trust_decay_per_min() -> f64 {
    0.1
}

fn default_anomaly_penalty() -> f64 {
    20.0
}

fn default_anomaly_threshold() -> f64 {
    0.5
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            token_lifetime_secs: default_token_lifetime_secs(),
            trust_threshold: default_trust_threshold(),
            trust_decay_per_min: default_trust_decay_per_min(),
            anomaly_penalty: default_anomaly_penalty(),
            anomaly_threshold: default_anomaly_threshold(),
        }
    }
}

/// Segmentation engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationSettings {
    /// Whether to install the built-in zero-trust policy set at construction.
    #[serde(default = "default_true")]
    pub install_default_policies: bool,

    /// Maximum number of entries retained in the in-memory traffic log.
    #[serde(default = "default_traffic_log_capacity")]
    pub traffic_log_capacity: usize,
}

fn default_true() -> bool {
    true
}

fn default_traffic_log_capacity() -> usize {
    10_000
}

impl Default for SegmentationSettings {
    fn default() -> Self {
        Self {
            install_default_policies: true,
            traffic_log_capacity: default_traffic_log_capacity(),
        }
    }
}

/// Traffic audit persistence settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditSettings {
    /// Path to the JSON-lines traffic audit file. `None` disables persistence.
    #[serde(default)]
    pub log_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_documented_values() {
        let config = ZerofenceConfig::default();
        assert_eq!(config.auth.token_lifetime_secs, 300);
        assert!((config.auth.trust_threshold - 70.0).abs() < f64::EPSILON);
        assert!((config.auth.trust_decay_per_min - 0.1).abs() < f64::EPSILON);
        assert!((config.auth.anomaly_penalty - 20.0).abs() < f64::EPSILON);
        assert!((config.auth.anomaly_threshold - 0.5).abs() < f64::EPSILON);
        assert!(config.segmentation.install_default_policies);
        assert_eq!(config.segmentation.traffic_log_capacity, 10_000);
        assert!(config.audit.log_path.is_none());
    }

    #[test]
    fn load_partial_toml_fills_defaults() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(
            f,
            r#"
[auth]
token_lifetime_secs = 60

[audit]
log_path = "/tmp/traffic.jsonl"
"#
        )
        .unwrap();
        f.flush().unwrap();

        let config = ZerofenceConfig::load(f.path()).unwrap();
        assert_eq!(config.auth.token_lifetime_secs, 60);
        // Untouched fields fall back to defaults.
        assert!((config.auth.trust_threshold - 70.0).abs() < f64::EPSILON);
        assert!(config.segmentation.install_default_policies);
        assert_eq!(
            config.audit.log_path.as_deref(),
            Some(Path::new("/tmp/traffic.jsonl"))
        );
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let err = ZerofenceConfig::load(Path::new("/nonexistent/zerofence.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn load_malformed_toml_is_an_error() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "this is not toml [[[").unwrap();
        f.flush().unwrap();
        assert!(ZerofenceConfig::load(f.path()).is_err());
    }
}
