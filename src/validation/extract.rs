//! JSON body extractor that runs `Validate` before the handler sees it.

use std::sync::Arc;

use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::http::response::error_response;
use crate::validation::{Validate, Validator};

/// A deserialized and validated JSON body.
///
/// Needs the server's `Arc<Validator>` as a request extension, which
/// `Server::initialise` installs.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let validator = req
            .extensions()
            .get::<Arc<Validator>>()
            .cloned()
            .ok_or_else(|| {
                tracing::error!("no validator installed on the router");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "validator unavailable")
            })?;

        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        value.validate(&validator).map_err(|errors| {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({ "errors": errors.messages() })),
            )
                .into_response()
        })?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrors;
    use axum::{body::Body, routing::post, Extension, Router};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct NewUser {
        email: String,
    }

    impl Validate for NewUser {
        fn validate(&self, v: &Validator) -> Result<(), ValidationErrors> {
            let mut errors = ValidationErrors::new();
            errors.check(v, "Email", &self.email, "required,email");
            errors.into_result()
        }
    }

    async fn create(ValidatedJson(user): ValidatedJson<NewUser>) -> String {
        user.email
    }

    fn app() -> Router {
        Router::new()
            .route("/users", post(create))
            .layer(Extension(Arc::new(Validator::new().unwrap())))
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/users")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_reaches_handler() {
        let res = app()
            .oneshot(json_request(r#"{"email":"a@example.com"}"#))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"a@example.com");
    }

    #[tokio::test]
    async fn test_invalid_body_is_unprocessable() {
        let res = app().oneshot(json_request(r#"{"email":"nope"}"#)).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["errors"]["Email"], "Email must be a valid email address");
    }

    #[tokio::test]
    async fn test_missing_validator_is_server_error() {
        let app = Router::new().route("/users", post(create));
        let res = app.oneshot(json_request(r#"{"email":"a@example.com"}"#)).await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
