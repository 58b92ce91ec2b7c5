//! Route composition: binds each route's stage plan to axum.
//!
//! Handler routes are registered in table order; static routes are deferred
//! and nested afterwards as prefix-stripped file servers. Conflicts the
//! router would panic on are reported as errors instead.

use std::collections::HashSet;
use std::path::PathBuf;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{MethodFilter, MethodRouter},
    Router,
};
use thiserror::Error;
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer};

use crate::auth::TokenService;
use crate::http::middleware::{
    access_level_middleware, authorisation_middleware, required_query_middleware, AccessLevelGate,
    RequiredQuery,
};
use crate::observability::metrics;
use crate::routing::route::Route;
use crate::routing::stage::{describe, plan_stages, Stage};

/// Why a route table could not be registered.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComposeError {
    #[error("route {route:?} has invalid path {path:?}")]
    InvalidPath { route: String, path: String },

    #[error("route {0:?} has no handler")]
    MissingHandler(String),

    #[error("route {route:?} uses unsupported method {method}")]
    UnsupportedMethod { route: String, method: Method },

    #[error("route {route:?} conflicts with an earlier registration of {method} {path}")]
    Conflict {
        route: String,
        method: Method,
        path: String,
    },

    #[error("route {route:?} has invalid content type {value:?}")]
    InvalidHeader { route: String, value: String },
}

/// Everything the stages need at bind time.
#[derive(Clone, Debug)]
pub struct ComposeContext {
    pub tokens: TokenService,
    /// Directory static routes are served from.
    pub static_root: PathBuf,
}

/// Register every route on `router`.
pub fn compose(routes: &[Route], mut router: Router, ctx: &ComposeContext) -> Result<Router, ComposeError> {
    let mut registered: HashSet<(String, Method)> = HashSet::new();
    let mut static_routes = Vec::new();

    for route in routes {
        if route.is_static_path {
            static_routes.push(route);
            continue;
        }

        if !route.path.starts_with('/') {
            return Err(ComposeError::InvalidPath {
                route: route.name.clone(),
                path: route.path.clone(),
            });
        }

        let handler = route
            .handler
            .clone()
            .ok_or_else(|| ComposeError::MissingHandler(route.name.clone()))?;
        let filter = method_filter(route)?;

        if !registered.insert((route.path.clone(), route.request_method.clone())) {
            return Err(ComposeError::Conflict {
                route: route.name.clone(),
                method: route.request_method.clone(),
                path: route.path.clone(),
            });
        }

        let method_router: MethodRouter = MethodRouter::new().on_service(filter, handler);
        let method_router = bind_stages(method_router, &plan_stages(route), ctx, &route.name)?;
        router = router.route(&route.path, method_router);

        tracing::info!(route = %route.name, "{}", describe(route));
        metrics::record_route_registered("handler");
    }

    let mut prefixes: HashSet<String> = HashSet::new();
    for route in static_routes {
        let trimmed = route.path.trim_matches('/');
        if trimmed.is_empty() {
            return Err(ComposeError::InvalidPath {
                route: route.name.clone(),
                path: route.path.clone(),
            });
        }

        let prefix = format!("/{}", trimmed);
        let shadows_handler = registered
            .iter()
            .any(|(path, _)| path == &prefix || path.starts_with(&format!("{}/", prefix)));
        if shadows_handler || !prefixes.insert(prefix.clone()) {
            return Err(ComposeError::Conflict {
                route: route.name.clone(),
                method: route.request_method.clone(),
                path: prefix,
            });
        }

        let filter = method_filter(route)?;
        let directory = ctx.static_root.join(trimmed);
        let mut method_router: MethodRouter = MethodRouter::new().on_service(filter, ServeDir::new(&directory));

        // Without an explicit type the file server's MIME guess stands.
        if !route.content_type.is_empty() {
            method_router = method_router.route_layer(SetResponseHeaderLayer::overriding(
                header::CONTENT_TYPE,
                header_value(&route.content_type, &route.name)?,
            ));
        }

        router = router.nest_service(&prefix, method_router);

        tracing::info!(
            route = %route.name,
            directory = %directory.display(),
            "Setting up STATIC {} Route: {}, on path: {}/",
            route.request_method,
            route.name,
            prefix
        );
        metrics::record_route_registered("static");
    }

    Ok(router)
}

/// Apply a stage plan. Layers wrap from the inside out, so the plan is
/// walked in reverse to leave the first stage outermost.
pub fn bind_stages(
    mut method_router: MethodRouter,
    stages: &[Stage],
    ctx: &ComposeContext,
    route_name: &str,
) -> Result<MethodRouter, ComposeError> {
    for stage in stages.iter().rev() {
        method_router = match stage {
            Stage::RequireQuery(names) => method_router.route_layer(from_fn_with_state(
                RequiredQuery::new(names),
                required_query_middleware,
            )),
            Stage::Authorisation => {
                method_router.route_layer(from_fn_with_state(ctx.tokens.clone(), authorisation_middleware))
            }
            Stage::AccessLevel { provided, required } => method_router.route_layer(from_fn_with_state(
                AccessLevelGate {
                    provided: *provided,
                    required: *required,
                },
                access_level_middleware,
            )),
            Stage::ContentType(value) => method_router.route_layer(SetResponseHeaderLayer::overriding(
                header::CONTENT_TYPE,
                header_value(value, route_name)?,
            )),
            Stage::DefaultContentType(value) => method_router.route_layer(SetResponseHeaderLayer::if_not_present(
                header::CONTENT_TYPE,
                header_value(value, route_name)?,
            )),
            Stage::CorsAllowAll => method_router.route_layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            )),
        };
    }
    Ok(method_router)
}

fn method_filter(route: &Route) -> Result<MethodFilter, ComposeError> {
    MethodFilter::try_from(route.request_method.clone()).map_err(|_| ComposeError::UnsupportedMethod {
        route: route.name.clone(),
        method: route.request_method.clone(),
    })
}

fn header_value(value: &str, route_name: &str) -> Result<HeaderValue, ComposeError> {
    HeaderValue::from_str(value).map_err(|_| ComposeError::InvalidHeader {
        route: route_name.to_string(),
        value: value.to_string(),
    })
}
