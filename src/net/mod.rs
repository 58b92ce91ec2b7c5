//! Network layer.
//!
//! Plain HTTP binds a `tokio::net::TcpListener` directly; TLS goes through
//! `axum-server` with the certificate pair from `app.ssl`.

pub mod tls;

pub use tls::{load_tls_config, TlsError};
