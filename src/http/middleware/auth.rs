//! Authentication and access-level gates.
//!
//! Both gates short-circuit with 401 and never run the inner handler on
//! rejection.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::auth::TokenService;
use crate::http::response::{unauthorized, unauthorized_bearer};
use crate::observability::metrics;

/// Provided and required access levels for one route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessLevelGate {
    pub provided: u32,
    pub required: u32,
}

impl AccessLevelGate {
    pub fn allows(&self) -> bool {
        self.provided >= self.required
    }
}

/// Let the request through only if the provided level meets the required one.
pub async fn access_level_middleware(
    State(gate): State<AccessLevelGate>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !gate.allows() {
        tracing::warn!(
            provided = gate.provided,
            required = gate.required,
            path = %req.uri().path(),
            "access level too low"
        );
        metrics::record_auth_rejection("access_level");
        return unauthorized();
    }
    next.run(req).await
}

/// Let the request through only if it carries a valid token.
pub async fn authorisation_middleware(
    State(tokens): State<TokenService>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if let Err(e) = tokens.token_valid(&req) {
        tracing::warn!(error = %e, path = %req.uri().path(), "error validating token");
        metrics::record_auth_rejection("authorisation");
        return unauthorized_bearer();
    }
    next.run(req).await
}
