use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

#[derive(Clone, Default)]
pub struct MakeUuidRequestId;

impl MakeRequestId for MakeUuidRequestId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        // A hyphenated UUID is always a valid header value.
        Uuid::new_v4()
            .to_string()
            .parse()
            .ok()
            .map(RequestId::new)
    }
}

/// Stamp every request with an `x-request-id`. Apply with `.layer(request_id_layer())`.
pub fn request_id_layer() -> SetRequestIdLayer<MakeUuidRequestId> {
    SetRequestIdLayer::new(
        axum::http::HeaderName::from_static(X_REQUEST_ID),
        MakeUuidRequestId,
    )
}

/// Echo the request's `x-request-id` on the response. Apply inside [`request_id_layer`].
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(axum::http::HeaderName::from_static(X_REQUEST_ID))
}
