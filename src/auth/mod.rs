//! Token-based authentication.
//!
//! Tokens are issued by business code (`TokenService::create_token`) and
//! checked by the authorisation gate in `http::middleware::auth`.

pub mod token;

pub use token::{extract_token, Claims, TokenError, TokenService};
