use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::serde::to_rfc3339_ms;

use crate::domain::types::ProfileUpdate;
use crate::error::ApiError;
use crate::handlers::ApiJson;
use crate::handlers::client::ClientInfo;
use crate::handlers::user::UserResponse;
use crate::state::AppState;
use crate::usecase::login_code::RequestCodeInput;
use crate::usecase::session::VerifyCodeInput;

// ── POST /auth/request-code ───────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestCodeRequest {
    pub email: String,
    pub refresh_url: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub preferred_language: Option<String>,
    pub language: Option<String>,
    pub device: Option<String>,
    pub browser: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestCodeResponse {
    pub message: &'static str,
    pub code_sent: bool,
    pub existing_token_valid: bool,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub valid_until: DateTime<Utc>,
    pub resent_existing_token: bool,
}

pub async fn request_code(
    State(state): State<AppState>,
    client: ClientInfo,
    ApiJson(body): ApiJson<RequestCodeRequest>,
) -> Result<(StatusCode, Json<RequestCodeResponse>), ApiError> {
    let output = state
        .request_code_usecase()
        .execute(RequestCodeInput {
            email: body.email,
            profile: ProfileUpdate {
                first_name: body.first_name,
                last_name: body.last_name,
                preferred_language: body.preferred_language,
            },
            client: client.into_metadata(body.device, body.browser, body.language),
            refresh_url: body.refresh_url,
        })
        .await?;

    let message = if output.resent_existing_token {
        "Aktywny kod logowania został wysłany ponownie."
    } else {
        "Kod logowania został wysłany na podany adres e-mail."
    };

    Ok((
        StatusCode::ACCEPTED,
        Json(RequestCodeResponse {
            message,
            code_sent: output.code_sent,
            existing_token_valid: output.existing_token_valid,
            valid_until: output.valid_until,
            resent_existing_token: output.resent_existing_token,
        }),
    ))
}

// ── POST /auth/verify ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeResponse {
    pub access_token: String,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

pub async fn verify_code(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<VerifyCodeRequest>,
) -> Result<Json<VerifyCodeResponse>, ApiError> {
    let output = state
        .verify_code_usecase()
        .execute(VerifyCodeInput {
            email: body.email,
            code: body.code,
        })
        .await?;

    Ok(Json(VerifyCodeResponse {
        access_token: output.access_token,
        expires_at: output.expires_at,
        user: output.user.into(),
    }))
}
