//! Signed bearer tokens.
//!
//! Tokens are HS256 JWTs carrying the user id in `sub` and a one hour
//! expiry. They are stateless: validity is signature plus expiry only.

use axum::http::{header, Request};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SharedConfig;

/// Lifetime of an issued token.
pub const TOKEN_LIFETIME_HOURS: i64 = 1;

/// Query string parameter checked before the Authorization header.
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Claims embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub authorized: bool,
    /// User id.
    pub sub: String,
    /// Expiration (unix seconds).
    pub exp: i64,
    /// Issued at (unix seconds).
    pub iat: i64,
}

/// Reasons a token could not be issued or accepted.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("no token supplied")]
    Missing,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("unexpected signing method: {0}")]
    WrongAlgorithm(String),

    #[error("token subject is not a valid uuid: {0}")]
    InvalidSubject(#[from] uuid::Error),

    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl TokenError {
    pub fn is_expired(&self) -> bool {
        matches!(self, TokenError::Expired)
    }

    fn from_verification(err: jsonwebtoken::errors::Error, alg: Option<Algorithm>) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                let alg = alg.map(|a| format!("{:?}", a)).unwrap_or_else(|| "unknown".into());
                TokenError::WrongAlgorithm(alg)
            }
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}

/// Issues and verifies tokens using the secret of the current config snapshot.
#[derive(Clone, Debug)]
pub struct TokenService {
    config: SharedConfig,
}

impl TokenService {
    pub fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    /// Create a token for `user_id` valid for one hour.
    pub fn create_token(&self, user_id: Uuid) -> Result<String, TokenError> {
        let exp = Utc::now() + Duration::hours(TOKEN_LIFETIME_HOURS);
        self.create_token_expiring_at(user_id, exp)
    }

    /// Create a token with an explicit expiry.
    pub fn create_token_expiring_at(
        &self,
        user_id: Uuid,
        exp: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            authorized: true,
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: Utc::now().timestamp(),
        };
        let key = EncodingKey::from_secret(&self.config.api_secret());
        encode(&Header::new(Algorithm::HS256), &claims, &key).map_err(TokenError::Signing)
    }

    /// Verify a raw token string and return its claims.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        if token.is_empty() {
            return Err(TokenError::Missing);
        }

        // Any HMAC variant is accepted; other families are rejected.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;

        let key = DecodingKey::from_secret(&self.config.api_secret());
        decode::<Claims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let alg = jsonwebtoken::decode_header(token).ok().map(|h| h.alg);
                TokenError::from_verification(e, alg)
            })
    }

    /// Extract and verify the request's token, returning the user id it carries.
    pub fn extract_user_id<B>(&self, req: &Request<B>) -> Result<Uuid, TokenError> {
        let claims = self.decode(&extract_token(req))?;
        Ok(Uuid::parse_str(&claims.sub)?)
    }

    /// Check that the request carries a valid token.
    pub fn token_valid<B>(&self, req: &Request<B>) -> Result<(), TokenError> {
        let claims = self.decode(&extract_token(req))?;
        tracing::debug!(subject = %claims.sub, expires = claims.exp, "user authenticated");
        Ok(())
    }
}

/// Pull a token from the `token` query parameter, falling back to an
/// `Authorization: Bearer <token>` header. Returns an empty string when
/// neither is usable.
pub fn extract_token<B>(req: &Request<B>) -> String {
    if let Some(query) = req.uri().query() {
        let from_query = url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == TOKEN_QUERY_PARAM)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty());
        if let Some(token) = from_query {
            return token;
        }
    }

    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let parts: Vec<&str> = bearer.split(' ').collect();
    if parts.len() == 2 {
        parts[1].to_string()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigMap;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    fn service_with_secret(secret: &str) -> TokenService {
        let mut config = ConfigMap::default();
        config.api.api_secret = secret.into();
        TokenService::new(SharedConfig::new(config))
    }

    fn bearer(token: &str) -> Request<()> {
        Request::builder()
            .uri("/me")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(())
            .unwrap()
    }

    #[test]
    fn test_round_trip_via_header() {
        let service = service_with_secret("test-secret-key-for-testing");
        let user_id = Uuid::new_v4();
        let token = service.create_token(user_id).unwrap();

        assert_eq!(service.extract_user_id(&bearer(&token)).unwrap(), user_id);
        assert!(service.token_valid(&bearer(&token)).is_ok());
    }

    #[test]
    fn test_round_trip_via_query() {
        let service = service_with_secret("test-secret-key-for-testing");
        let user_id = Uuid::new_v4();
        let token = service.create_token(user_id).unwrap();

        let req = Request::builder()
            .uri(format!("/me?page=2&token={}", token))
            .body(())
            .unwrap();
        assert_eq!(service.extract_user_id(&req).unwrap(), user_id);
    }

    #[test]
    fn test_query_takes_precedence_over_header() {
        let service = service_with_secret("secret");
        let token = service.create_token(Uuid::new_v4()).unwrap();

        let req = Request::builder()
            .uri(format!("/me?token={}", token))
            .header(header::AUTHORIZATION, "Bearer garbage")
            .body(())
            .unwrap();
        assert!(service.token_valid(&req).is_ok());
    }

    #[test]
    fn test_claims_content() {
        let service = service_with_secret("secret");
        let user_id = Uuid::new_v4();
        let claims = service.decode(&service.create_token(user_id).unwrap()).unwrap();

        assert!(claims.authorized);
        assert_eq!(claims.sub, user_id.to_string());
        let lifetime = claims.exp - claims.iat;
        assert!((3599..=3601).contains(&lifetime));
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = service_with_secret("secret");
        let token = service
            .create_token_expiring_at(Uuid::new_v4(), Utc::now() - Duration::hours(1))
            .unwrap();

        let err = service.token_valid(&bearer(&token)).unwrap_err();
        assert!(err.is_expired());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = service_with_secret("one");
        let verifier = service_with_secret("two");
        let token = issuer.create_token(Uuid::new_v4()).unwrap();

        let err = verifier.token_valid(&bearer(&token)).unwrap_err();
        assert!(matches!(err, TokenError::InvalidSignature));
    }

    #[test]
    fn test_secret_rotation_follows_config() {
        let mut config = ConfigMap::default();
        config.api.api_secret = "before".into();
        let shared = SharedConfig::new(config.clone());
        let service = TokenService::new(shared.clone());
        let token = service.create_token(Uuid::new_v4()).unwrap();

        config.api.api_secret = "after".into();
        shared.store(config);

        assert!(service.token_valid(&bearer(&token)).is_err());
    }

    #[test]
    fn test_non_hmac_algorithm_rejected() {
        let service = service_with_secret("secret");
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            format!(
                r#"{{"authorized":true,"sub":"{}","exp":{},"iat":0}}"#,
                Uuid::new_v4(),
                Utc::now().timestamp() + 3600
            )
            .as_bytes(),
        );
        let token = format!("{}.{}.{}", header, payload, URL_SAFE_NO_PAD.encode(b"sig"));

        let err = service.token_valid(&bearer(&token)).unwrap_err();
        assert!(matches!(err, TokenError::WrongAlgorithm(_)), "got {:?}", err);
    }

    #[test]
    fn test_other_hmac_variants_accepted() {
        let service = service_with_secret("secret");
        let claims = Claims {
            authorized: true,
            sub: Uuid::new_v4().to_string(),
            exp: Utc::now().timestamp() + 600,
            iat: Utc::now().timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        assert_eq!(service.decode(&token).unwrap(), claims);
    }

    #[test]
    fn test_non_uuid_subject_rejected() {
        let service = service_with_secret("secret");
        let claims = Claims {
            authorized: true,
            sub: "not-a-uuid".into(),
            exp: Utc::now().timestamp() + 600,
            iat: Utc::now().timestamp(),
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"secret")).unwrap();

        // Signature is fine, so the token itself is valid ...
        assert!(service.token_valid(&bearer(&token)).is_ok());
        // ... but there is no user id to extract.
        let err = service.extract_user_id(&bearer(&token)).unwrap_err();
        assert!(matches!(err, TokenError::InvalidSubject(_)));
    }

    #[test]
    fn test_missing_or_mangled_header() {
        let service = service_with_secret("secret");
        let token = service.create_token(Uuid::new_v4()).unwrap();

        let none = Request::builder().uri("/").body(()).unwrap();
        assert!(matches!(service.token_valid(&none), Err(TokenError::Missing)));

        // Three parts: not a bearer header, so no token is used.
        let extra = Request::builder()
            .uri("/")
            .header(header::AUTHORIZATION, format!("Bearer {} extra", token))
            .body(())
            .unwrap();
        assert_eq!(extract_token(&extra), "");
        assert!(service.token_valid(&extra).is_err());

        assert!(matches!(
            service.token_valid(&bearer("not.a.jwt")),
            Err(TokenError::Malformed(_))
        ));
    }
}
