use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::handlers::ApiJson;
use crate::handlers::client::ClientInfo;
use crate::state::AppState;
use crate::usecase::contact::ContactInput;

#[derive(Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
    pub subject: Option<String>,
    pub phone: Option<String>,
    pub language: Option<String>,
}

#[derive(Serialize)]
pub struct ContactResponse {
    pub message: &'static str,
}

pub async fn send_contact(
    State(state): State<AppState>,
    client: ClientInfo,
    ApiJson(body): ApiJson<ContactRequest>,
) -> Result<(StatusCode, Json<ContactResponse>), ApiError> {
    state
        .contact_usecase()
        .execute(ContactInput {
            name: body.name,
            email: body.email,
            message: body.message,
            subject: body.subject,
            phone: body.phone,
            client: client.into_metadata(None, None, body.language),
        })
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ContactResponse {
            message: "Dziękujemy! Wiadomość została wysłana.",
        }),
    ))
}
