//! Required query-string parameters.
//!
//! A route that declares query parameters only matches requests carrying all
//! of them; anything else gets the same 404 an unmatched path would.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Names that must all be present in the query string.
#[derive(Clone, Debug)]
pub struct RequiredQuery {
    names: Arc<[String]>,
}

impl RequiredQuery {
    pub fn new(names: &[String]) -> Self {
        Self {
            names: names.into(),
        }
    }

    pub fn matches(&self, query: Option<&str>) -> bool {
        let present: Vec<String> = query
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .map(|(key, _)| key.into_owned())
                    .collect()
            })
            .unwrap_or_default();
        self.names.iter().all(|name| present.contains(name))
    }
}

pub async fn required_query_middleware(
    State(required): State<RequiredQuery>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !required.matches(req.uri().query()) {
        tracing::debug!(path = %req.uri().path(), "required query parameters missing");
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(req).await
}
