//! Per-device authentication context and derived-state helpers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// How a device authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// Pre-shared device secret verified against the registry bundle.
    Jwt,
    /// Mutual TLS client certificate.
    Mtls,
    /// Bearer token from an external OAuth provider.
    Oauth,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::Jwt => "jwt",
            AuthMethod::Mtls => "mtls",
            AuthMethod::Oauth => "oauth",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMethod {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jwt" => Ok(AuthMethod::Jwt),
            "mtls" => Ok(AuthMethod::Mtls),
            "oauth" => Ok(AuthMethod::Oauth),
            other => Err(AuthError::UnknownMethod(other.to_string())),
        }
    }
}

/// The live authentication record for one device.
///
/// Created only by successful authentication (trust starts at 100), mutated
/// by continuous checks and refresh, destroyed by revocation. The invariant
/// `expires_at == auth_time + token_lifetime` holds at creation and at every
/// refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    pub device_id: String,
    pub device_type: String,
    pub auth_method: AuthMethod,
    pub auth_time: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Current trust score in [0, 100].
    pub trust_score: f64,
    /// Cleared once an anomalous behavior signal is observed.
    pub behavior_normal: bool,
    pub location_verified: bool,
    pub certificate_valid: bool,
}

impl AuthContext {
    /// Whether the session has passed its expiry. Expiry is discovered
    /// lazily on read; nothing enforces it in the background.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Whether the device is currently trusted at the given threshold.
    pub fn is_trusted(&self, min_trust_score: f64) -> bool {
        !self.is_expired()
            && self.trust_score >= min_trust_score
            && self.behavior_normal
            && self.certificate_valid
    }
}
