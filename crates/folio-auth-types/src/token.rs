//! Session-token (JWT) validation.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "issuer", test))]
use serde::Serialize;
use uuid::Uuid;

/// Authenticated identity extracted from a validated session token.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub user_id: Uuid,
    pub email: String,
    pub expires_at: u64,
}

/// Errors returned by [`validate_session_token`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// JWT claims carried by a session token.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | user ID (UUID string) |
/// | `email` | custom | normalized account email |
/// | `exp` | `exp` | expiry, seconds since epoch |
///
/// [`Serialize`] requires the **`issuer`** cargo feature; only the API
/// service mints tokens.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "issuer", test), derive(Serialize))]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    pub exp: u64,
}

/// Decode and validate a session JWT: HS256, `exp` checked, `exp` + `sub` required.
fn decode_jwt(token: &str, secret: &str) -> Result<SessionClaims, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?;

    Ok(data.claims)
}

/// Validate a bearer session token, returning the parsed identity.
pub fn validate_session_token(token: &str, secret: &str) -> Result<SessionInfo, AuthError> {
    let claims = decode_jwt(token, secret)?;
    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| AuthError::Malformed)?;
    Ok(SessionInfo {
        user_id,
        email: claims.email,
        expires_at: claims.exp,
    })
}
