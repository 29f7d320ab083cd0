//! Credential primitives: password hashing and signed identity claims.
//!
//! Hashing and token signing are delegated to vetted crates; nothing
//! cryptographic is implemented here.

use chrono::{DateTime, Duration, Utc};
use derive_more::{Display, Error};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Token lifetime. Claims stay valid until natural expiry; there is no
/// server-side revocation list.
pub const TOKEN_TTL_DAYS: i64 = 7;

/// Bcrypt cost factor for new password hashes.
const BCRYPT_COST: u32 = 10;

/// Authentication failure.
#[derive(Debug, Display, Error)]
pub enum AuthError {
    /// No bearer token was presented.
    #[display("Missing Authorization token")]
    MissingToken,
    /// The token was malformed, forged, or expired.
    #[display("Invalid or expired token")]
    InvalidToken,
    /// Token serialization failed while signing.
    #[display("Token signing failed: {_0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// Signed identity claim presented by the client on authorized calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Database id of the player.
    pub player_id: i32,
    /// Normalized account email.
    pub email: String,
    /// Display name at issuance time.
    pub player_name: String,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

impl Claims {
    /// Builds a claim for the given identity, expiring [`TOKEN_TTL_DAYS`]
    /// from `now`.
    pub fn new(player_id: i32, email: String, player_name: String, now: DateTime<Utc>) -> Self {
        Self {
            player_id,
            email,
            player_name,
            exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        }
    }
}

/// HMAC key used to sign and verify claims.
#[derive(Clone)]
pub struct TokenKey {
    secret: String,
}

impl std::fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKey").finish_non_exhaustive()
    }
}

impl TokenKey {
    /// Creates a key from the configured secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Signs a claim into a compact token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Signing`] if claim serialization fails.
    #[instrument(skip_all, fields(player_id = claims.player_id))]
    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        jsonwebtoken::encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(AuthError::Signing)
    }

    /// Verifies a token's signature and expiry, yielding its claims.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] for any malformed, forged, or
    /// expired token.
    #[instrument(skip_all)]
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| {
            debug!(error = %e, "Token verification failed");
            AuthError::InvalidToken
        })?;
        Ok(data.claims)
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// # Errors
///
/// Returns [`AuthError::MissingToken`] when the header is absent or does not
/// carry a bearer token.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    header
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)
}

/// Hashes a password with bcrypt at the standard cost.
///
/// # Errors
///
/// Returns the underlying bcrypt error if hashing fails.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, BCRYPT_COST)
}

/// Verifies a password against a stored bcrypt hash.
///
/// The comparison inside bcrypt is constant-time with respect to the hash.
///
/// # Errors
///
/// Returns the underlying bcrypt error if the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, hash)
}
