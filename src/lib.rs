//! Web service scaffolding: route table composition, bearer tokens, request
//! validation and hot-reloaded YAML config on top of Axum.

pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod validation;

pub use auth::TokenService;
pub use config::{ConfigMap, SharedConfig};
pub use http::{Server, ServerError};
pub use lifecycle::Shutdown;
pub use routing::Route;
pub use validation::{ValidatedJson, Validator};
