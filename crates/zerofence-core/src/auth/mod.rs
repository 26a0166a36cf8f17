//! Continuous zero-trust device authentication.
//!
//! A device earns an [`context::AuthContext`] only through a successful
//! [`authenticator::ZeroTrustAuthenticator::authenticate_device`] call, which
//! issues a signed, time-bounded token. From there the context only decays:
//! behavioral signals penalize the trust score, time erodes it, and the
//! session ends in expiry, violation, or revocation. Only a fresh
//! authentication restores full trust.

pub mod authenticator;
pub mod context;
pub mod credentials;
pub mod token;
