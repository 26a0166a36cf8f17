//! Error types for the authentication subsystem.
//!
//! Credential verification failures are ordinary return values, never
//! panics. Token verification distinguishes `Expired` (recoverable through
//! the refresh path while the device is still trusted) from `Invalid`
//! (tampered or malformed — never recoverable, forces re-authentication).

use thiserror::Error;

/// A failed authentication-service operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("unknown authentication method: {0}")]
    UnknownMethod(String),

    #[error("credential verification failed for device {device_id} ({reason})")]
    CredentialsRejected { device_id: String, reason: String },

    #[error("no active session for device {0}")]
    NoSession(String),

    #[error("device {device_id} is not trusted (trust score {score:.1} below {threshold:.1})")]
    NotTrusted {
        device_id: String,
        score: f64,
        threshold: f64,
    },

    #[error(transparent)]
    Token(#[from] TokenError),
}

/// A failed token verification, classified.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TokenError {
    /// The signature checked out but `expires_at` has passed.
    #[error("token expired")]
    Expired,

    /// Malformed encoding, undecodable claims, or a signature mismatch.
    #[error("invalid token: {0}")]
    Invalid(String),
}

pub type AuthResult<T> = std::result::Result<T, AuthError>;
