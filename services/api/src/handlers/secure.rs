use axum::{Json, extract::State};
use serde::Serialize;

use folio_auth_types::bearer::BearerSession;

use crate::state::AppState;

#[derive(Serialize)]
pub struct ContactInfoResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// `GET /secure/contact`: owner's contact details, signed-in visitors only.
pub async fn contact_info(
    State(state): State<AppState>,
    session: BearerSession,
) -> Json<ContactInfoResponse> {
    tracing::debug!(user_id = %session.user_id, "contact info requested");
    Json(ContactInfoResponse {
        email: state.config.public_contact_email(),
        phone: state.config.contact_phone.clone(),
        location: state.config.contact_location.clone(),
    })
}
