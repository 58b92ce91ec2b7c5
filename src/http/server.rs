//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the validator (fatal if it cannot be built)
//! - Compose the route table onto an Axum router
//! - Wire up request ids and tracing
//! - Serve plain or TLS with graceful shutdown
//! - Call the upstream API configured in `api.api_endpoint`

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    http::{header, Method, StatusCode},
    Extension, Router,
};
use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::auth::TokenService;
use crate::config::SharedConfig;
use crate::http::request::with_request_tracing;
use crate::lifecycle::shutdown::wait;
use crate::net::TlsError;
use crate::observability::metrics;
use crate::routing::{compose, ComposeContext, ComposeError, Route};
use crate::validation::{Validator, ValidatorError};

/// How long TLS connections get to drain after shutdown is signalled.
const TLS_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build validator: {0}")]
    Validator(#[from] ValidatorError),

    #[error("failed to register routes: {0}")]
    Compose(#[from] ComposeError),

    #[error("server i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("tls setup failed: {0}")]
    Tls(#[from] TlsError),

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Failure of an outbound call to the configured API.
#[derive(Debug, Error)]
pub enum ApiCallError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered {status}")]
    UnexpectedStatus {
        url: String,
        status: StatusCode,
        body: String,
    },
}

impl ApiCallError {
    /// Every non-200 answer counts as "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiCallError::UnexpectedStatus { .. })
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiCallError::UnexpectedStatus { status, .. } => Some(*status),
            ApiCallError::Transport { .. } => None,
        }
    }
}

/// Web server: router, validator and config snapshot handle.
pub struct Server {
    router: Router,
    validator: Arc<Validator>,
    config: SharedConfig,
    tokens: TokenService,
    client: reqwest::Client,
}

impl Server {
    pub fn new(config: SharedConfig) -> Result<Self, ServerError> {
        let validator = Validator::new().map_err(|e| {
            tracing::error!(error = %e, "could not build validator");
            e
        })?;

        let client = reqwest::Client::builder().build().map_err(ServerError::Client)?;

        Ok(Self {
            router: Router::new(),
            validator: Arc::new(validator),
            tokens: TokenService::new(config.clone()),
            config,
            client,
        })
    }

    /// Register `routes` and install the shared layers.
    ///
    /// Handlers can pull the validator from request extensions (see
    /// `ValidatedJson`).
    pub fn initialise(&mut self, routes: &[Route]) -> Result<(), ServerError> {
        let ctx = ComposeContext {
            tokens: self.tokens.clone(),
            static_root: self.config.load().app.static_root.clone().into(),
        };

        let composed = compose(routes, std::mem::take(&mut self.router), &ctx)?;
        self.router = with_request_tracing(composed.layer(Extension(self.validator.clone())));

        tracing::info!(routes = routes.len(), "routes initialised");
        Ok(())
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn validator(&self) -> Arc<Validator> {
        self.validator.clone()
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// The composed router, for driving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve plain HTTP on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let handle = axum_server::Handle::new();
        let signal = handle.clone();
        tokio::spawn(async move {
            wait(shutdown).await;
            signal.graceful_shutdown(Some(TLS_DRAIN_TIMEOUT));
        });

        tracing::info!(address = %addr, "HTTPS server starting");
        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    /// Send `body` to `<api_endpoint>/<url>` and return the response body.
    ///
    /// Anything other than 200 is an error carrying the status and body.
    pub async fn interface_with_api(&self, url: &str, method: Method, body: Vec<u8>) -> Result<Bytes, ApiCallError> {
        let target = join_endpoint(&self.config.load().api.api_endpoint, url);

        let result = self.send(&target, method.clone(), body).await;
        match &result {
            Ok(_) => metrics::record_api_call("ok"),
            Err(ApiCallError::UnexpectedStatus { status, .. }) => {
                tracing::warn!(url = %target, %method, %status, "api call returned unexpected status");
                metrics::record_api_call("unexpected_status");
            }
            Err(e @ ApiCallError::Transport { .. }) => {
                tracing::error!(url = %target, %method, error = %e, "api call failed");
                metrics::record_api_call("transport_error");
            }
        }
        result
    }

    async fn send(&self, target: &str, method: Method, body: Vec<u8>) -> Result<Bytes, ApiCallError> {
        let transport = |source| ApiCallError::Transport {
            url: target.to_string(),
            source,
        };

        let response = self
            .client
            .request(method, target)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(transport)?;

        if status != StatusCode::OK {
            return Err(ApiCallError::UnexpectedStatus {
                url: target.to_string(),
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        Ok(bytes)
    }
}

/// Join `endpoint` and `path` with exactly one `/` between them.
pub fn join_endpoint(endpoint: &str, path: &str) -> String {
    let endpoint = endpoint.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return endpoint.to_string();
    }
    format!("{}/{}", endpoint, path)
}
