//! Per-route middleware bound by the route composer.

pub mod auth;
pub mod query;

pub use auth::{access_level_middleware, authorisation_middleware, AccessLevelGate};
pub use query::{required_query_middleware, RequiredQuery};
