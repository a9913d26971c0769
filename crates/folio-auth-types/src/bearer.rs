//! `Authorization: Bearer` session extractor.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use http::header::AUTHORIZATION;
use http::request::Parts;
use uuid::Uuid;

use crate::token::{AuthError, validate_session_token};

/// HMAC secret used to validate session tokens. Provide it from the router
/// state via `FromRef`.
#[derive(Clone)]
pub struct SessionSecret(pub Arc<str>);

/// Identity of a caller holding a valid session token.
///
/// Rejects with 401 when the header is absent, is not a bearer credential,
/// or carries a token that fails validation.
#[derive(Debug, Clone)]
pub struct BearerSession {
    pub user_id: Uuid,
    pub email: String,
    pub expires_at: u64,
}

/// Rejection returned by [`BearerSession`]. Always 401 with the same body so
/// callers cannot tell a missing token from a forged one.
#[derive(Debug)]
pub struct BearerRejection;

impl IntoResponse for BearerRejection {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "kind": "INVALID_TOKEN",
            "message": "Brak lub nieprawidłowy token sesji.",
        });
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_owned())
}

impl<S> FromRequestParts<S> for BearerSession
where
    S: Send + Sync,
    SessionSecret: FromRef<S>,
{
    type Rejection = BearerRejection;

    // Extract synchronously, then return a 'static future (see axum-core 0.5
    // `FromRequestParts` signature).
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let secret = SessionSecret::from_ref(state);
        let token = bearer_token(parts);

        async move {
            let token = token.ok_or(BearerRejection)?;
            let info = validate_session_token(&token, &secret.0).map_err(|e| {
                if !matches!(e, AuthError::Expired) {
                    tracing::debug!(error = %e, "rejected session token");
                }
                BearerRejection
            })?;
            Ok(Self {
                user_id: info.user_id,
                email: info.email,
                expires_at: info.expires_at,
            })
        }
    }
}
