//! Request correlation.
//!
//! Every request gets an `x-request-id` (generated unless the client sent
//! one), recorded on the trace span and echoed on the response.

use axum::{http::HeaderName, Router};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Wrap `router` with request-id and tracing layers. Set runs first, then
/// the trace span, then propagation onto the response.
pub fn with_request_tracing(router: Router) -> Router {
    router
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
}
