use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Method, Request, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Span;

use folio_core::health::live;
use folio_core::middleware::{X_REQUEST_ID, propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    auth::{request_code, verify_code},
    contact::send_contact,
    health::ready,
    secure::contact_info,
    user::create_user,
};
use crate::infra::rate_limit::rate_limit;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Write endpoints share one fixed-window limiter keyed by (client, path).
    let limited = Router::new()
        .route("/auth/request-code", post(request_code))
        .route("/auth/verify", post(verify_code))
        .route("/users", post(create_user))
        .route("/contact", post(send_contact))
        .route_layer(middleware::from_fn_with_state(
            state.limiter.clone(),
            rate_limit,
        ));

    Router::new()
        // Health
        .route("/health", get(ready))
        .route("/health/ready", get(ready))
        .route("/health/live", get(live))
        // Guarded
        .route("/secure/contact", get(contact_info))
        .merge(limited)
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(propagate_request_id_layer())
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("none");
    tracing::info_span!(
        "http-request",
        method = %request.method(),
        path = request.uri().path(),
        request_id
    )
}

/// Empty `origins` → any origin.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(%origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
