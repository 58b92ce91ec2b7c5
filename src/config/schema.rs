//! Configuration schema definitions.
//!
//! Mirrors the layout of `config.yaml`. Every section and field has a
//! default so a partial file still deserializes.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the web application.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ConfigMap {
    /// Web/app settings (host, port, TLS material).
    pub app: WebConfig,

    /// API settings, including the token signing secret.
    pub api: ApiConfig,

    /// Database credentials.
    pub db: DbConfig,

    /// Billing provider credentials.
    pub stripe: StripeConfig,
}

/// Web application settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct WebConfig {
    /// Fully qualified domain name the app is served under.
    pub fqdn: String,

    /// Deployment environment (e.g., "dev", "prod").
    pub env: String,

    /// Bind IP.
    pub ip: String,

    /// Bind port.
    pub port: u16,

    pub domain_short: String,

    /// TLS material. TLS is enabled when both key paths are set.
    pub ssl: CertsConfig,

    /// Directory static routes are served from.
    pub static_root: String,

    /// Prometheus exporter bind address. Disabled when unset.
    pub metrics_address: Option<String>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            fqdn: String::new(),
            env: "dev".to_string(),
            ip: "0.0.0.0".to_string(),
            port: 8080,
            domain_short: String::new(),
            ssl: CertsConfig::default(),
            static_root: "./public".to_string(),
            metrics_address: None,
        }
    }
}

impl WebConfig {
    /// `ip:port` string suitable for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}

/// Certificate paths (PEM).
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct CertsConfig {
    pub private_key: String,
    pub public_key: String,
    pub ca_key: String,
}

impl CertsConfig {
    pub fn is_enabled(&self) -> bool {
        !self.private_key.is_empty() && !self.public_key.is_empty()
    }
}

/// API settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// HMAC secret used to sign and verify tokens.
    pub api_secret: String,

    /// Base URL for outbound API calls.
    pub api_endpoint: String,

    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct SecurityConfig {
    pub token: TokenConfig,
}

/// Token policy.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TokenConfig {
    pub value: String,

    #[serde(with = "humane_duration")]
    pub expiry_time: Duration,

    #[serde(with = "humane_duration")]
    pub refresh_interval: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            value: String::new(),
            expiry_time: Duration::from_secs(3600),
            refresh_interval: Duration::from_secs(900),
        }
    }
}

/// Database credentials.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            username: String::new(),
            password: String::new(),
        }
    }
}

/// Billing provider credentials.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct StripeConfig {
    pub secret_key: String,
    pub public_key: String,
    pub webhook_secret: String,
    pub account_id: String,
}

/// Serde adapter for durations written as `"1h"`, `"30m"`, `"90s"`,
/// `"250ms"`, or compound forms like `"1h30m"`. A bare integer is seconds.
pub mod humane_duration {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = value.as_millis();
        if millis % 1000 == 0 {
            serializer.serialize_str(&format!("{}s", millis / 1000))
        } else {
            serializer.serialize_str(&format!("{}ms", millis))
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Seconds(secs) => Ok(Duration::from_secs(secs)),
            Raw::Text(text) => parse(&text).map_err(de::Error::custom),
        }
    }

    /// Parse a duration string such as `"1h30m"`.
    pub fn parse(input: &str) -> Result<Duration, String> {
        let input = input.trim();
        if input.is_empty() {
            return Err("empty duration".to_string());
        }

        let mut total = Duration::ZERO;
        let mut rest = input;
        while !rest.is_empty() {
            let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            if digits == 0 {
                return Err(format!("invalid duration {:?}", input));
            }
            let amount: u64 = rest[..digits]
                .parse()
                .map_err(|_| format!("invalid duration {:?}", input))?;
            rest = &rest[digits..];

            let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
            let unit = &rest[..unit_len];
            rest = &rest[unit_len..];

            let part = match unit {
                "h" => amount.checked_mul(3600).map(Duration::from_secs),
                "m" => amount.checked_mul(60).map(Duration::from_secs),
                "s" | "" => Some(Duration::from_secs(amount)),
                "ms" => Some(Duration::from_millis(amount)),
                other => return Err(format!("unknown duration unit {:?} in {:?}", other, input)),
            };
            total = part
                .and_then(|part| total.checked_add(part))
                .ok_or_else(|| format!("duration {:?} is too large", input))?;
        }
        Ok(total)
    }
}
