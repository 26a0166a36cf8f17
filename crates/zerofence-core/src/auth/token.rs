//! Signed device tokens.
//!
//! Tokens are a base64url-encoded JSON claim set followed by an HMAC-SHA256
//! signature over the encoded claims: `claims.signature`. A single
//! in-process key is sufficient — there is no distributed coordination, so
//! any holder of the verifier can check integrity and expiry independently.
//!
//! Verification checks the signature before expiry: a tampered token is
//! [`TokenError::Invalid`] even if its claims also look expired.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::context::AuthMethod;
use crate::error::TokenError;

type HmacSha256 = Hmac<Sha256>;

/// Length of the signing key in bytes (256 bits).
const KEY_BYTES: usize = 32;

/// Claims carried by an issued token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub device_id: String,
    pub device_type: String,
    pub auth_method: AuthMethod,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub trust_score: f64,
}

impl TokenClaims {
    /// Whether the claim set's expiry has passed.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// A freshly issued token: the encoded wire string plus its claims.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub encoded: String,
    pub claims: TokenClaims,
}

impl IssuedToken {
    /// The encoded token string.
    pub fn as_str(&self) -> &str {
        &self.encoded
    }
}

/// Signs and verifies device tokens with a single in-process key.
pub struct TokenSigner {
    key: Vec<u8>,
}

impl TokenSigner {
    /// Create a signer with a fresh random 256-bit key.
    pub fn new() -> Self {
        let mut key = vec![0u8; KEY_BYTES];
        rand::rng().fill(key.as_mut_slice());
        Self { key }
    }

    /// Create a signer from existing key material, e.g. loaded from a vault.
    pub fn from_key(key: &[u8]) -> Self {
        Self { key: key.to_vec() }
    }

    /// Sign a claim set into its wire encoding.
    pub fn sign(&self, claims: &TokenClaims) -> Result<IssuedToken, TokenError> {
        let claims_json = serde_json::to_vec(claims)
            .map_err(|e| TokenError::Invalid(format!("claims serialization failed: {e}")))?;
        let claims_b64 = URL_SAFE_NO_PAD.encode(&claims_json);

        let mut mac = self.mac();
        mac.update(claims_b64.as_bytes());
        let sig_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(IssuedToken {
            encoded: format!("{claims_b64}.{sig_b64}"),
            claims: claims.clone(),
        })
    }

    /// Verify a token's integrity and expiry, returning its claims.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let (claims_b64, sig_b64) = token
            .split_once('.')
            .ok_or_else(|| TokenError::Invalid("malformed token: missing signature".into()))?;

        let signature = URL_SAFE_NO_PAD
            .decode(sig_b64)
            .map_err(|e| TokenError::Invalid(format!("signature not base64: {e}")))?;

        let mut mac = self.mac();
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::Invalid("signature mismatch".into()))?;

        let claims_json = URL_SAFE_NO_PAD
            .decode(claims_b64)
            .map_err(|e| TokenError::Invalid(format!("claims not base64: {e}")))?;
        let claims: TokenClaims = serde_json::from_slice(&claims_json)
            .map_err(|e| TokenError::Invalid(format!("claims not decodable: {e}")))?;

        if claims.is_expired() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length.
        HmacSha256::new_from_slice(&self.key).expect("HMAC key length")
    }
}

impl Default for TokenSigner {
    fn default() -> Self {
        Self::new()
    }
}
