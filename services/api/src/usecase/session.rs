use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use folio_auth_types::token::SessionClaims;

use crate::domain::repository::{LoginTokenRepository, UserRepository};
use crate::domain::types::{User, normalize_email};
use crate::error::ApiError;

/// Sign an HS256 session token for `user`, valid for `ttl`.
pub fn issue_session_token(
    user: &User,
    secret: &str,
    ttl: Duration,
) -> Result<(String, DateTime<Utc>), ApiError> {
    let exp = (Utc::now() + ttl).timestamp().max(0) as u64;
    let claims = SessionClaims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(e.into()))?;
    let expires_at = Utc
        .timestamp_opt(exp as i64, 0)
        .single()
        .ok_or_else(|| anyhow::anyhow!("session expiry out of range"))?;
    Ok((token, expires_at))
}

// ── VerifyCode (login) ────────────────────────────────────────────────────────

pub struct VerifyCodeInput {
    pub email: String,
    pub code: String,
}

#[derive(Debug)]
pub struct VerifyCodeOutput {
    pub user: User,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct VerifyCodeUseCase<U: UserRepository, T: LoginTokenRepository> {
    pub users: U,
    pub tokens: T,
    pub jwt_secret: String,
    pub session_ttl: Duration,
}

impl<U: UserRepository, T: LoginTokenRepository> VerifyCodeUseCase<U, T> {
    pub async fn execute(&self, input: VerifyCodeInput) -> Result<VerifyCodeOutput, ApiError> {
        let email = normalize_email(&input.email)?;
        let code = input.code.trim();
        if code.is_empty() {
            return Err(ApiError::validation("Podaj kod logowania."));
        }

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(ApiError::InvalidCode)?;

        let token = self
            .tokens
            .find_unrevoked(user.id, code)
            .await?
            .ok_or(ApiError::InvalidCode)?;

        if token.consumed_at.is_some() {
            return Err(ApiError::CodeAlreadyUsed);
        }
        if token.is_expired_at(Utc::now()) {
            return Err(ApiError::CodeExpired);
        }
        // Lost a race with a concurrent verify of the same code.
        if !self.tokens.consume(token.id).await? {
            return Err(ApiError::CodeAlreadyUsed);
        }

        let (access_token, expires_at) =
            issue_session_token(&user, &self.jwt_secret, self.session_ttl)?;
        tracing::info!(user_id = %user.id, "login code verified");

        Ok(VerifyCodeOutput {
            user,
            access_token,
            expires_at,
        })
    }
}
