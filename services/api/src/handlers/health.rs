use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ReadyStatus {
    pub status: &'static str,
    pub database: &'static str,
}

/// Handler for `GET /health` and `GET /health/ready`: pings the store.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyStatus>) {
    match state.db.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ReadyStatus {
                status: "ok",
                database: "up",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "database ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadyStatus {
                    status: "unavailable",
                    database: "down",
                }),
            )
        }
    }
}
