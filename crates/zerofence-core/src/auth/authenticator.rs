//! The zero-trust authenticator.
//!
//! Verifies device credentials, issues and refreshes signed tokens, and runs
//! continuous trust evaluation against the per-device context store. Trust
//! starts at 100 on authentication and only decays from there — time erodes
//! it linearly, anomalous behavior signals knock off a fixed penalty, and a
//! refresh renews the session window without restoring trust. Only a fresh
//! authentication resets the score.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::context::{AuthContext, AuthMethod};
use super::credentials::{AcceptAllChains, CertificateVerifier, DeviceCredentials};
use super::token::{IssuedToken, TokenClaims, TokenSigner};
use crate::config::AuthSettings;
use crate::error::{AuthError, AuthResult, TokenError};

/// A behavioral observation from the external detection subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorSignal {
    /// Anomaly score in [0.0, 1.0].
    pub anomaly_score: f64,
    /// Optional category label from the threat classifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threat_category: Option<String>,
}

impl BehaviorSignal {
    /// A signal carrying only an anomaly score.
    pub fn score(anomaly_score: f64) -> Self {
        Self {
            anomaly_score,
            threat_category: None,
        }
    }
}

/// Outcome of a continuous authentication check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustCheck {
    /// The device remains trusted.
    Trusted,
    /// No context exists for the device. Untrusted, but not a fault.
    NoSession,
    /// The session expired; only re-authentication or (earlier) refresh helps.
    Expired,
    /// The trust conditions failed: low score, abnormal behavior, or bad
    /// certificate.
    Violated,
}

impl TrustCheck {
    /// Whether the check passed.
    pub fn is_trusted(&self) -> bool {
        matches!(self, TrustCheck::Trusted)
    }
}

/// Monotonic authenticator counters plus derived gauges, snapshotted for
/// observability scraping.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuthMetrics {
    pub auth_attempts: u64,
    pub auth_success: u64,
    pub auth_failures: u64,
    pub token_refreshes: u64,
    pub trust_violations: u64,
    pub mtls_verifications: u64,
    pub continuous_auth_checks: u64,
    /// Devices with a live context right now.
    pub active_sessions: u64,
    /// Percentage of attempts that succeeded.
    pub auth_success_rate: f64,
    /// Mean trust score across live contexts.
    pub avg_trust_score: f64,
}

#[derive(Default)]
struct Counters {
    auth_attempts: AtomicU64,
    auth_success: AtomicU64,
    auth_failures: AtomicU64,
    token_refreshes: AtomicU64,
    trust_violations: AtomicU64,
    mtls_verifications: AtomicU64,
    continuous_auth_checks: AtomicU64,
}

/// The zero-trust authentication authority.
pub struct ZeroTrustAuthenticator {
    signer: TokenSigner,
    token_lifetime: Duration,
    trust_threshold: f64,
    trust_decay_per_min: f64,
    anomaly_penalty: f64,
    anomaly_threshold: f64,
    contexts: RwLock<HashMap<String, AuthContext>>,
    cert_verifier: Box<dyn CertificateVerifier>,
    counters: Counters,
}

impl Default for ZeroTrustAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}

impl ZeroTrustAuthenticator {
    /// Create an authenticator with default settings and a fresh signing key.
    pub fn new() -> Self {
        Self::from_settings(&AuthSettings::default())
    }

    /// Create an authenticator from configuration.
    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self {
            signer: TokenSigner::new(),
            token_lifetime: Duration::seconds(settings.token_lifetime_secs as i64),
            trust_threshold: settings.trust_threshold,
            trust_decay_per_min: settings.trust_decay_per_min,
            anomaly_penalty: settings.anomaly_penalty,
            anomaly_threshold: settings.anomaly_threshold,
            contexts: RwLock::new(HashMap::new()),
            cert_verifier: Box::new(AcceptAllChains),
            counters: Counters::default(),
        }
    }

    /// Substitute the certificate chain verifier, e.g. a real PKI backend.
    pub fn with_certificate_verifier(mut self, verifier: Box<dyn CertificateVerifier>) -> Self {
        self.cert_verifier = verifier;
        self
    }

    // -----------------------------------------------------------------------
    // Authentication
    // -----------------------------------------------------------------------

    /// Authenticate a device and issue a fresh token.
    ///
    /// Success always replaces any existing context for the device and
    /// resets its trust to 100. Failure leaves all state untouched.
    pub fn authenticate_device(
        &self,
        device_id: &str,
        device_type: &str,
        credentials: &DeviceCredentials,
        method: AuthMethod,
    ) -> AuthResult<IssuedToken> {
        self.counters.auth_attempts.fetch_add(1, Ordering::Relaxed);

        if let Err(e) = self.verify_credentials(device_id, credentials, method) {
            self.counters.auth_failures.fetch_add(1, Ordering::Relaxed);
            warn!(device_id, %method, error = %e, "authentication failed");
            return Err(e);
        }

        let auth_time = Utc::now();
        let context = AuthContext {
            device_id: device_id.to_string(),
            device_type: device_type.to_string(),
            auth_method: method,
            auth_time,
            expires_at: auth_time + self.token_lifetime,
            trust_score: 100.0,
            behavior_normal: true,
            location_verified: true,
            certificate_valid: true,
        };

        let token = self.issue_token(&context)?;
        self.contexts
            .write()
            .expect("context store lock poisoned")
            .insert(device_id.to_string(), context);

        self.counters.auth_success.fetch_add(1, Ordering::Relaxed);
        info!(device_id, %method, "device authenticated");
        Ok(token)
    }

    fn verify_credentials(
        &self,
        device_id: &str,
        credentials: &DeviceCredentials,
        method: AuthMethod,
    ) -> AuthResult<()> {
        let rejected = |reason: &str| {
            Err(AuthError::CredentialsRejected {
                device_id: device_id.to_string(),
                reason: reason.to_string(),
            })
        };

        match method {
            AuthMethod::Jwt => match credentials.device_key.as_deref() {
                Some(key) if !key.is_empty() => Ok(()),
                _ => rejected("missing device key"),
            },
            AuthMethod::Mtls => {
                let Some(cert) = credentials.certificate.as_ref() else {
                    return rejected("missing certificate");
                };
                self.counters.mtls_verifications.fetch_add(1, Ordering::Relaxed);
                if !cert.in_validity_window(Utc::now()) {
                    return rejected("certificate outside validity window");
                }
                if !self.cert_verifier.verify_chain(cert) {
                    return rejected("certificate chain rejected");
                }
                Ok(())
            }
            AuthMethod::Oauth => match credentials.oauth_token.as_deref() {
                Some(token) if !token.is_empty() => Ok(()),
                _ => rejected("missing oauth token"),
            },
        }
    }

    // -----------------------------------------------------------------------
    // Continuous authentication
    // -----------------------------------------------------------------------

    /// Feed a behavioral signal into the device's trust state.
    ///
    /// An anomalous signal (score above the configured threshold) subtracts
    /// the fixed penalty and marks behavior abnormal; a clean signal applies
    /// linear decay for the minutes elapsed since authentication. The score
    /// is clamped to [0, 100].
    pub fn continuous_authentication_check(
        &self,
        device_id: &str,
        signal: &BehaviorSignal,
    ) -> TrustCheck {
        self.counters
            .continuous_auth_checks
            .fetch_add(1, Ordering::Relaxed);

        let mut contexts = self.contexts.write().expect("context store lock poisoned");
        let Some(context) = contexts.get_mut(device_id) else {
            warn!(device_id, "continuous check without an active session");
            return TrustCheck::NoSession;
        };

        if context.is_expired() {
            warn!(device_id, "continuous check against an expired session");
            return TrustCheck::Expired;
        }

        if signal.anomaly_score > self.anomaly_threshold {
            context.trust_score -= self.anomaly_penalty;
            context.behavior_normal = false;
            warn!(
                device_id,
                anomaly_score = signal.anomaly_score,
                category = signal.threat_category.as_deref().unwrap_or("unclassified"),
                trust_score = context.trust_score,
                "anomalous behavior signal"
            );
        } else {
            let elapsed_min =
                (Utc::now() - context.auth_time).num_seconds() as f64 / 60.0;
            context.trust_score -= self.trust_decay_per_min * elapsed_min;
        }
        context.trust_score = context.trust_score.clamp(0.0, 100.0);

        if context.is_trusted(self.trust_threshold) {
            TrustCheck::Trusted
        } else {
            self.counters.trust_violations.fetch_add(1, Ordering::Relaxed);
            warn!(
                device_id,
                trust_score = context.trust_score,
                "trust violation"
            );
            TrustCheck::Violated
        }
    }

    // -----------------------------------------------------------------------
    // Token lifecycle
    // -----------------------------------------------------------------------

    /// Renew a trusted device's session window.
    ///
    /// Resets `auth_time`/`expires_at` but carries the trust score forward —
    /// renewal is not re-authentication and earns no trust back.
    pub fn refresh_token(&self, device_id: &str) -> AuthResult<IssuedToken> {
        let mut contexts = self.contexts.write().expect("context store lock poisoned");
        let Some(context) = contexts.get_mut(device_id) else {
            return Err(AuthError::NoSession(device_id.to_string()));
        };

        if !context.is_trusted(self.trust_threshold) {
            return Err(AuthError::NotTrusted {
                device_id: device_id.to_string(),
                score: context.trust_score,
                threshold: self.trust_threshold,
            });
        }

        let auth_time = Utc::now();
        context.auth_time = auth_time;
        context.expires_at = auth_time + self.token_lifetime;
        let token = self.issue_token(context)?;

        self.counters.token_refreshes.fetch_add(1, Ordering::Relaxed);
        info!(device_id, trust_score = context.trust_score, "token refreshed");
        Ok(token)
    }

    /// Revoke a device's authentication. Later checks report no session.
    /// Returns whether a context existed.
    pub fn revoke_authentication(&self, device_id: &str) -> bool {
        let removed = self
            .contexts
            .write()
            .expect("context store lock poisoned")
            .remove(device_id)
            .is_some();
        if removed {
            warn!(device_id, "authentication revoked");
        }
        removed
    }

    /// Verify a presented token, distinguishing expiry from tampering.
    pub fn verify_token(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.signer.verify(token)
    }

    fn issue_token(&self, context: &AuthContext) -> AuthResult<IssuedToken> {
        let claims = TokenClaims {
            device_id: context.device_id.clone(),
            device_type: context.device_type.clone(),
            auth_method: context.auth_method,
            issued_at: context.auth_time,
            expires_at: context.expires_at,
            trust_score: context.trust_score,
        };
        Ok(self.signer.sign(&claims)?)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Current trust score of a device, if it has a live context.
    pub fn trust_score(&self, device_id: &str) -> Option<f64> {
        self.contexts
            .read()
            .expect("context store lock poisoned")
            .get(device_id)
            .map(|c| c.trust_score)
    }

    /// Snapshot of a device's context.
    pub fn context(&self, device_id: &str) -> Option<AuthContext> {
        self.contexts
            .read()
            .expect("context store lock poisoned")
            .get(device_id)
            .cloned()
    }

    /// Snapshot of the authenticator counters and derived gauges.
    pub fn metrics(&self) -> AuthMetrics {
        let (active_sessions, avg_trust_score) = {
            let contexts = self.contexts.read().expect("context store lock poisoned");
            let n = contexts.len();
            let avg = if n > 0 {
                contexts.values().map(|c| c.trust_score).sum::<f64>() / n as f64
            } else {
                0.0
            };
            (n as u64, avg)
        };

        let attempts = self.counters.auth_attempts.load(Ordering::Relaxed);
        let success = self.counters.auth_success.load(Ordering::Relaxed);
        let success_rate = if attempts > 0 {
            100.0 * success as f64 / attempts as f64
        } else {
            0.0
        };

        AuthMetrics {
            auth_attempts: attempts,
            auth_success: success,
            auth_failures: self.counters.auth_failures.load(Ordering::Relaxed),
            token_refreshes: self.counters.token_refreshes.load(Ordering::Relaxed),
            trust_violations: self.counters.trust_violations.load(Ordering::Relaxed),
            mtls_verifications: self.counters.mtls_verifications.load(Ordering::Relaxed),
            continuous_auth_checks: self
                .counters
                .continuous_auth_checks
                .load(Ordering::Relaxed),
            active_sessions,
            auth_success_rate: success_rate,
            avg_trust_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::CertificateData;
    use chrono::Duration;

    fn authenticator() -> ZeroTrustAuthenticator {
        ZeroTrustAuthenticator::new()
    }

    fn jwt_creds() -> DeviceCredentials {
        DeviceCredentials::with_device_key("registry-secret")
    }

    fn valid_cert() -> CertificateData {
        let now = Utc::now();
        CertificateData {
            subject: "CN=cam_01".to_string(),
            issuer: "CN=fleet-ca".to_string(),
            not_before: now - Duration::days(1),
            not_after: now + Duration::days(30),
        }
    }

    // -- Authentication --

    #[test]
    fn jwt_auth_succeeds_with_device_key() {
        let auth = authenticator();
        let token = auth
            .authenticate_device("cam_01", "smart_camera", &jwt_creds(), AuthMethod::Jwt)
            .unwrap();
        assert_eq!(token.claims.device_id, "cam_01");
        assert!((token.claims.trust_score - 100.0).abs() < f64::EPSILON);

        let ctx = auth.context("cam_01").unwrap();
        assert!(ctx.behavior_normal);
        assert_eq!(ctx.expires_at, ctx.auth_time + Duration::seconds(300));
    }

    #[test]
    fn jwt_auth_fails_without_device_key() {
        let auth = authenticator();
        let err = auth
            .authenticate_device(
                "cam_01",
                "smart_camera",
                &DeviceCredentials::default(),
                AuthMethod::Jwt,
            )
            .unwrap_err();
        assert!(matches!(err, AuthError::CredentialsRejected { .. }));
        assert!(auth.context("cam_01").is_none());
        assert_eq!(auth.metrics().auth_failures, 1);
    }

    #[test]
    fn mtls_auth_checks_validity_window() {
        let auth = authenticator();
        let mut cert = valid_cert();
        cert.not_after = Utc::now() - Duration::days(1);
        let err = auth
            .authenticate_device(
                "sensor_07",
                "industrial_sensor",
                &DeviceCredentials::with_certificate(cert),
                AuthMethod::Mtls,
            )
            .unwrap_err();
        assert!(matches!(err, AuthError::CredentialsRejected { .. }));
        assert_eq!(auth.metrics().mtls_verifications, 1);

        let token = auth.authenticate_device(
            "sensor_07",
            "industrial_sensor",
            &DeviceCredentials::with_certificate(valid_cert()),
            AuthMethod::Mtls,
        );
        assert!(token.is_ok());
    }

    #[test]
    fn mtls_auth_respects_pluggable_chain_verifier() {
        struct RejectAll;
        impl CertificateVerifier for RejectAll {
            fn verify_chain(&self, _certificate: &CertificateData) -> bool {
                false
            }
        }

        let auth = authenticator().with_certificate_verifier(Box::new(RejectAll));
        let err = auth
            .authenticate_device(
                "sensor_07",
                "industrial_sensor",
                &DeviceCredentials::with_certificate(valid_cert()),
                AuthMethod::Mtls,
            )
            .unwrap_err();
        assert!(matches!(err, AuthError::CredentialsRejected { .. }));
    }

    #[test]
    fn oauth_auth_requires_non_empty_token() {
        let auth = authenticator();
        assert!(auth
            .authenticate_device(
                "plug_02",
                "smart_plug",
                &DeviceCredentials::with_oauth_token(""),
                AuthMethod::Oauth,
            )
            .is_err());
        assert!(auth
            .authenticate_device(
                "plug_02",
                "smart_plug",
                &DeviceCredentials::with_oauth_token("bearer-xyz"),
                AuthMethod::Oauth,
            )
            .is_ok());
    }

    #[test]
    fn reauthentication_resets_degraded_trust() {
        let auth = authenticator();
        auth.authenticate_device("cam_01", "smart_camera", &jwt_creds(), AuthMethod::Jwt)
            .unwrap();

        // Degrade trust with anomalous signals.
        auth.continuous_authentication_check("cam_01", &BehaviorSignal::score(0.9));
        auth.continuous_authentication_check("cam_01", &BehaviorSignal::score(0.9));
        let degraded = auth.context("cam_01").unwrap();
        assert!(degraded.trust_score < 70.0);
        assert!(!degraded.behavior_normal);

        auth.authenticate_device("cam_01", "smart_camera", &jwt_creds(), AuthMethod::Jwt)
            .unwrap();
        let fresh = auth.context("cam_01").unwrap();
        assert!((fresh.trust_score - 100.0).abs() < f64::EPSILON);
        assert!(fresh.behavior_normal);
    }

    // -- Continuous authentication --

    #[test]
    fn anomaly_penalty_accumulates_per_check() {
        let auth = authenticator();
        auth.authenticate_device("cam_01", "smart_camera", &jwt_creds(), AuthMethod::Jwt)
            .unwrap();

        // First anomalous check: 100 - 20 = 80, but behavior flips abnormal
        // so the device is already untrusted.
        let check = auth.continuous_authentication_check("cam_01", &BehaviorSignal::score(0.8));
        assert_eq!(check, TrustCheck::Violated);
        assert!((auth.trust_score("cam_01").unwrap() - 80.0).abs() < 1e-9);

        // Second: 60, below the threshold on score alone.
        auth.continuous_authentication_check("cam_01", &BehaviorSignal::score(0.8));
        assert!((auth.trust_score("cam_01").unwrap() - 60.0).abs() < 1e-9);

        // Score clamps at zero.
        for _ in 0..10 {
            auth.continuous_authentication_check("cam_01", &BehaviorSignal::score(0.99));
        }
        assert!((auth.trust_score("cam_01").unwrap() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn clean_signal_keeps_device_trusted() {
        let auth = authenticator();
        auth.authenticate_device("cam_01", "smart_camera", &jwt_creds(), AuthMethod::Jwt)
            .unwrap();

        let check = auth.continuous_authentication_check("cam_01", &BehaviorSignal::score(0.1));
        assert_eq!(check, TrustCheck::Trusted);
        // Decay over a fresh session is negligible but the score may dip
        // fractionally below 100.
        let score = auth.trust_score("cam_01").unwrap();
        assert!(score > 99.0 && score <= 100.0);
        assert!(auth.context("cam_01").unwrap().behavior_normal);
    }

    #[test]
    fn score_at_threshold_is_not_anomalous() {
        let auth = authenticator();
        auth.authenticate_device("cam_01", "smart_camera", &jwt_creds(), AuthMethod::Jwt)
            .unwrap();
        // Exactly 0.5 is not above the threshold.
        let check = auth.continuous_authentication_check("cam_01", &BehaviorSignal::score(0.5));
        assert_eq!(check, TrustCheck::Trusted);
        assert!(auth.context("cam_01").unwrap().behavior_normal);
    }

    #[test]
    fn check_without_session_reports_no_session() {
        let auth = authenticator();
        let check = auth.continuous_authentication_check("ghost", &BehaviorSignal::score(0.1));
        assert_eq!(check, TrustCheck::NoSession);
        assert!(!check.is_trusted());
        // Not a violation, just an absent session.
        assert_eq!(auth.metrics().trust_violations, 0);
        assert_eq!(auth.metrics().continuous_auth_checks, 1);
    }

    #[test]
    fn check_against_expired_session_fails_immediately() {
        let settings = AuthSettings {
            token_lifetime_secs: 0,
            ..AuthSettings::default()
        };
        let auth = ZeroTrustAuthenticator::from_settings(&settings);
        auth.authenticate_device("cam_01", "smart_camera", &jwt_creds(), AuthMethod::Jwt)
            .unwrap();

        let check = auth.continuous_authentication_check("cam_01", &BehaviorSignal::score(0.0));
        assert_eq!(check, TrustCheck::Expired);
        // Score untouched by an expired-session check.
        assert!((auth.trust_score("cam_01").unwrap() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn trust_violations_counted_per_failed_check() {
        let auth = authenticator();
        auth.authenticate_device("cam_01", "smart_camera", &jwt_creds(), AuthMethod::Jwt)
            .unwrap();
        auth.continuous_authentication_check("cam_01", &BehaviorSignal::score(0.9));
        auth.continuous_authentication_check("cam_01", &BehaviorSignal::score(0.9));
        let metrics = auth.metrics();
        assert_eq!(metrics.trust_violations, 2);
        assert_eq!(metrics.continuous_auth_checks, 2);
    }

    // -- Refresh --

    #[test]
    fn refresh_extends_window_but_keeps_trust() {
        let auth = authenticator();
        auth.authenticate_device("cam_01", "smart_camera", &jwt_creds(), AuthMethod::Jwt)
            .unwrap();
        // A clean check nudges trust slightly below 100 via decay.
        auth.continuous_authentication_check("cam_01", &BehaviorSignal::score(0.1));
        let before = auth.context("cam_01").unwrap();

        let token = auth.refresh_token("cam_01").unwrap();
        let after = auth.context("cam_01").unwrap();
        assert!(after.auth_time >= before.auth_time);
        assert_eq!(after.expires_at, after.auth_time + Duration::seconds(300));
        // Trust carried forward, not reset.
        assert!((after.trust_score - before.trust_score).abs() < f64::EPSILON);
        assert!((token.claims.trust_score - before.trust_score).abs() < f64::EPSILON);
        assert_eq!(auth.metrics().token_refreshes, 1);
    }

    #[test]
    fn refresh_rejected_once_untrusted() {
        let auth = authenticator();
        auth.authenticate_device("cam_01", "smart_camera", &jwt_creds(), AuthMethod::Jwt)
            .unwrap();
        auth.continuous_authentication_check("cam_01", &BehaviorSignal::score(0.9));
        auth.continuous_authentication_check("cam_01", &BehaviorSignal::score(0.9));

        let err = auth.refresh_token("cam_01").unwrap_err();
        assert!(matches!(err, AuthError::NotTrusted { .. }));
        assert_eq!(auth.metrics().token_refreshes, 0);
    }

    #[test]
    fn refresh_without_session_is_no_session() {
        let auth = authenticator();
        let err = auth.refresh_token("ghost").unwrap_err();
        assert_eq!(err, AuthError::NoSession("ghost".to_string()));
    }

    // -- Revocation & tokens --

    #[test]
    fn revocation_removes_the_context() {
        let auth = authenticator();
        auth.authenticate_device("cam_01", "smart_camera", &jwt_creds(), AuthMethod::Jwt)
            .unwrap();
        assert!(auth.revoke_authentication("cam_01"));
        assert!(!auth.revoke_authentication("cam_01"));
        assert!(auth.context("cam_01").is_none());
        assert_eq!(
            auth.continuous_authentication_check("cam_01", &BehaviorSignal::score(0.1)),
            TrustCheck::NoSession
        );
    }

    #[test]
    fn issued_token_verifies_and_carries_claims() {
        let auth = authenticator();
        let token = auth
            .authenticate_device("cam_01", "smart_camera", &jwt_creds(), AuthMethod::Jwt)
            .unwrap();
        let claims = auth.verify_token(token.as_str()).unwrap();
        assert_eq!(claims.device_id, "cam_01");
        assert_eq!(claims.device_type, "smart_camera");
        assert_eq!(claims.auth_method, AuthMethod::Jwt);
    }

    #[test]
    fn tampered_token_is_invalid_not_expired() {
        let auth = authenticator();
        let token = auth
            .authenticate_device("cam_01", "smart_camera", &jwt_creds(), AuthMethod::Jwt)
            .unwrap();
        let mut tampered = token.encoded.clone();
        tampered.pop();
        assert!(matches!(
            auth.verify_token(&tampered).unwrap_err(),
            TokenError::Invalid(_)
        ));
    }

    // -- Metrics --

    #[test]
    fn metrics_snapshot_derives_gauges() {
        let auth = authenticator();
        auth.authenticate_device("cam_01", "smart_camera", &jwt_creds(), AuthMethod::Jwt)
            .unwrap();
        auth.authenticate_device("plug_02", "smart_plug", &jwt_creds(), AuthMethod::Jwt)
            .unwrap();
        auth.authenticate_device(
            "bad",
            "smart_plug",
            &DeviceCredentials::default(),
            AuthMethod::Jwt,
        )
        .ok();

        let metrics = auth.metrics();
        assert_eq!(metrics.auth_attempts, 3);
        assert_eq!(metrics.auth_success, 2);
        assert_eq!(metrics.auth_failures, 1);
        assert_eq!(metrics.active_sessions, 2);
        assert!((metrics.auth_success_rate - 200.0 / 3.0).abs() < 0.01);
        assert!((metrics.avg_trust_score - 100.0).abs() < f64::EPSILON);
    }
}
