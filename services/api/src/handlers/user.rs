use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use folio_core::serde::to_rfc3339_ms;

use crate::domain::types::{ProfileUpdate, User};
use crate::error::ApiError;
use crate::handlers::ApiJson;
use crate::handlers::client::ClientInfo;
use crate::state::AppState;
use crate::usecase::user::SignupInput;

/// Public view of an account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

// ── POST /users ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub preferred_language: Option<String>,
    pub refresh_url: Option<String>,
    pub language: Option<String>,
    pub device: Option<String>,
    pub browser: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub message: &'static str,
    pub code_sent: bool,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub valid_until: DateTime<Utc>,
    pub user: UserResponse,
}

pub async fn create_user(
    State(state): State<AppState>,
    client: ClientInfo,
    ApiJson(body): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let output = state
        .signup_usecase()
        .execute(SignupInput {
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

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "Konto zostało utworzone. Kod logowania wysłano na podany adres e-mail.",
            code_sent: output.code_sent,
            valid_until: output.valid_until,
            user: output.user.into(),
        }),
    ))
}
