//! Device credential material and the pluggable certificate verifier.
//!
//! Credential bundles come from an external device registry and are opaque
//! to this crate: the authenticator only checks the field its method needs.
//! Certificate chain and signature verification is delegated to a
//! [`CertificateVerifier`] implementation; the engine itself only enforces
//! the validity window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Credential bundle presented at authentication time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceCredentials {
    /// Pre-shared device secret for the `jwt` method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_key: Option<String>,

    /// Client certificate metadata for the `mtls` method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<CertificateData>,

    /// Bearer token for the `oauth` method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_token: Option<String>,
}

impl DeviceCredentials {
    /// Bundle carrying only a device secret.
    pub fn with_device_key(key: &str) -> Self {
        Self {
            device_key: Some(key.to_string()),
            ..Self::default()
        }
    }

    /// Bundle carrying only a certificate.
    pub fn with_certificate(certificate: CertificateData) -> Self {
        Self {
            certificate: Some(certificate),
            ..Self::default()
        }
    }

    /// Bundle carrying only an OAuth token.
    pub fn with_oauth_token(token: &str) -> Self {
        Self {
            oauth_token: Some(token.to_string()),
            ..Self::default()
        }
    }
}

/// Parsed client certificate fields needed for policy decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateData {
    pub subject: String,
    pub issuer: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
}

impl CertificateData {
    /// Whether `now` falls within the certificate's validity window.
    pub fn in_validity_window(&self, now: DateTime<Utc>) -> bool {
        now >= self.not_before && now <= self.not_after
    }
}

/// Chain and signature verification, pluggable so a real PKI backend can be
/// substituted without touching the authenticator.
pub trait CertificateVerifier: Send + Sync {
    /// Verify the certificate's chain of trust. Validity-window checking is
    /// done by the caller.
    fn verify_chain(&self, certificate: &CertificateData) -> bool;
}

/// Default verifier: accepts any chain. Window checks still apply.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllChains;

impl CertificateVerifier for AcceptAllChains {
    fn verify_chain(&self, _certificate: &CertificateData) -> bool {
        true
    }
}
