//! Configuration validation.
//!
//! Serde handles the syntax; this module checks the values. All failures are
//! reported, not just the first.

use thiserror::Error;

use crate::config::schema::ConfigMap;

/// A single semantic problem in a loaded config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("api.api_secret must not be empty")]
    EmptyApiSecret,

    #[error("api.api_endpoint {0:?} must be an absolute http(s) URL")]
    InvalidApiEndpoint(String),

    #[error("app.static_root must not be empty")]
    EmptyStaticRoot,
}

/// Validate a config, returning every problem found.
pub fn validate_config(config: &ConfigMap) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.api.api_secret.is_empty() {
        errors.push(ValidationError::EmptyApiSecret);
    }

    let endpoint = &config.api.api_endpoint;
    if !endpoint.is_empty() {
        match url::Url::parse(endpoint) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => errors.push(ValidationError::InvalidApiEndpoint(endpoint.clone())),
        }
    }

    if config.app.static_root.is_empty() {
        errors.push(ValidationError::EmptyStaticRoot);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ConfigMap {
        let mut config = ConfigMap::default();
        config.api.api_secret = "secret".into();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ConfigMap::default();
        config.api.api_endpoint = "ftp://example.com".into();
        config.app.static_root.clear();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyApiSecret,
                ValidationError::InvalidApiEndpoint("ftp://example.com".into()),
                ValidationError::EmptyStaticRoot,
            ]
        );
    }

    #[test]
    fn test_relative_endpoint_rejected() {
        let mut config = valid();
        config.api.api_endpoint = "/api/v1".into();
        assert!(validate_config(&config).is_err());

        config.api.api_endpoint = "https://api.example.com/v1".into();
        assert!(validate_config(&config).is_ok());
    }
}
