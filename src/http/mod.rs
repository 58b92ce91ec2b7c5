//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → request.rs (request id, trace span)
//!     → middleware/ (per-route query, token and access-level gates)
//!     → route handler
//!     → response.rs (error bodies)
//!     → Send to client
//! ```
//!
//! `server.rs` owns the composed router and the outbound API client.

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{with_request_tracing, X_REQUEST_ID};
pub use response::{error_response, format_error, unauthorized, ErrorBody};
pub use server::{join_endpoint, ApiCallError, Server, ServerError};
