//! Demo web service.
//!
//! ```text
//!     Client Request
//!     ──────▶ request id + trace span
//!             ──▶ per-route stages: cors → query match → token → access level → content type
//!                 ──▶ handler (or static file server)
//!     ◀────── response
//! ```
//!
//! Loads `config.yaml`, watches it for changes, and serves a small route
//! table: an index page, a health check, a login that issues tokens, an
//! authorised profile endpoint and static assets.

use std::net::SocketAddr;

use axum::{
    extract::Request,
    http::{Method, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use uuid::Uuid;

use web_scaffold::auth::TokenService;
use web_scaffold::config::{read_environment_file, ConfigWatcher, SharedConfig};
use web_scaffold::http::{error_response, Server};
use web_scaffold::lifecycle::Shutdown;
use web_scaffold::net::load_tls_config;
use web_scaffold::observability::{logging, metrics};
use web_scaffold::routing::Route;
use web_scaffold::validation::{Validate, ValidatedJson, ValidationErrors, Validator};

#[derive(Debug, Deserialize)]
struct LoginRequest {
    user_id: String,
    password: String,
}

impl Validate for LoginRequest {
    fn validate(&self, validator: &Validator) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors
            .check(validator, "UserId", &self.user_id, "requiredUuid")
            .check(validator, "Password", &self.password, "required,passwd");
        errors.into_result()
    }
}

fn demo_routes(tokens: &TokenService) -> Vec<Route> {
    let login_tokens = tokens.clone();
    let me_tokens = tokens.clone();

    vec![
        Route::new("index", Method::GET, "/", || async {
            Html("<!doctype html><title>web-scaffold</title><h1>It works</h1>")
        })
        .description("landing page"),
        Route::new("health", Method::GET, "/health", || async {
            Json(serde_json::json!({ "status": "ok" }))
        })
        .json()
        .cors_allow_all(),
        Route::new(
            "login",
            Method::POST,
            "/login",
            move |ValidatedJson(body): ValidatedJson<LoginRequest>| {
                let tokens = login_tokens.clone();
                async move { login(&tokens, body) }
            },
        )
        .description("issue a token")
        .json(),
        Route::new("me", Method::GET, "/me", move |req: Request| {
            let tokens = me_tokens.clone();
            async move { me(&tokens, &req) }
        })
        .description("current user")
        .authorised()
        .access_level(1)
        .json(),
        Route::static_files("assets", "assets"),
    ]
}

fn login(tokens: &TokenService, body: LoginRequest) -> Response {
    // The password is only checked for strength here; there is no user store.
    let user_id = match Uuid::parse_str(&body.user_id) {
        Ok(id) => id,
        Err(_) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, "invalid user id"),
    };

    match tokens.create_token(user_id) {
        Ok(token) => Json(serde_json::json!({ "token": token })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to issue token");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "could not issue token")
        }
    }
}

fn me(tokens: &TokenService, req: &Request) -> Response {
    match tokens.extract_user_id(req) {
        Ok(user_id) => Json(serde_json::json!({ "user_id": user_id })).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "authorised request without a readable user id");
            web_scaffold::http::unauthorized()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init(logging::DEFAULT_DIRECTIVES);
    tracing::info!("web-scaffold v{} starting", env!("CARGO_PKG_VERSION"));

    let (path, config) = match read_environment_file() {
        Ok(found) => found,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };
    tracing::info!(path = %path.display(), env = %config.app.env, "Configuration loaded");

    let shared = SharedConfig::new(config);

    // Dropping the watcher stops reloads, so hold it for the life of main.
    let _watcher = match ConfigWatcher::new(&path, shared.clone()).run() {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            tracing::warn!(error = %e, "Config hot reload disabled");
            None
        }
    };

    let snapshot = shared.load();

    if let Some(metrics_address) = &snapshot.app.metrics_address {
        match metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let mut server = Server::new(shared.clone())?;
    let routes = demo_routes(server.tokens());
    server.initialise(&routes)?;

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let bind_address = snapshot.app.bind_address();
    if snapshot.app.ssl.is_enabled() {
        let tls = load_tls_config(&snapshot.app.ssl).await?;
        let addr: SocketAddr = bind_address.parse()?;
        server.run_tls(addr, tls, shutdown.subscribe()).await?;
    } else {
        let listener = TcpListener::bind(&bind_address).await?;
        tracing::info!(address = %listener.local_addr()?, "Listening for connections");
        server.run(listener, shutdown.subscribe()).await?;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
