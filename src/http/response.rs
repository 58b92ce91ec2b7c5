//! Response helpers shared by middleware and handlers.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// JSON error body: `{"error": "<message>"}`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

/// Build an error response with a JSON body.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

/// The 401 sent by both auth gates.
pub fn unauthorized() -> Response {
    error_response(StatusCode::UNAUTHORIZED, "unauthorized")
}

/// 401 with a `WWW-Authenticate: Bearer` challenge, for a missing or bad token.
pub fn unauthorized_bearer() -> Response {
    let mut response = unauthorized();
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    response
}

/// Turn a storage-layer error message into something safe to show a user.
///
/// Unique-constraint failures name the offending column; credential lookups
/// are reported without saying which half was wrong.
pub fn format_error(message: &str) -> String {
    if message.contains("username") {
        return "username is already taken".to_string();
    }
    if message.contains("email") {
        return "email address is already taken".to_string();
    }
    if message.contains("hashedPassword") {
        return "incorrect username or password".to_string();
    }
    message.to_string()
}
