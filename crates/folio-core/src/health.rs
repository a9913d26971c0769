use ::serde::Serialize;
use axum::Json;
use axum::http::StatusCode;

#[derive(Debug, Serialize)]
pub struct LiveStatus {
    pub status: &'static str,
}

/// Handler for `GET /health/live`: process liveness, never touches the store.
pub async fn live() -> (StatusCode, Json<LiveStatus>) {
    (StatusCode::OK, Json(LiveStatus { status: "ok" }))
}
