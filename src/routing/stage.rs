//! Middleware stages, planned from route flags.
//!
//! A plan is plain data in execution order: the first stage sees the
//! request first. Binding a plan to a transport lives in `composer.rs`.

use crate::routing::route::Route;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const HTML_CONTENT_TYPE: &str = "text/html";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// 404 unless every named query parameter is present.
    RequireQuery(Vec<String>),
    /// 401 unless the request carries a valid token.
    Authorisation,
    /// 401 if `provided < required`.
    AccessLevel { provided: u32, required: u32 },
    /// Set the response `Content-Type`, replacing any handler value.
    ContentType(String),
    /// Set the response `Content-Type` only if the handler left it unset.
    DefaultContentType(String),
    /// `Access-Control-Allow-Origin: *`.
    CorsAllowAll,
}

/// Stages for a non-static route, outermost first.
///
/// CORS wraps everything else so gate rejections carry the header too.
/// The access-level stage compares the route's level against itself, so it
/// always passes. There is no caller level to compare against yet.
pub fn plan_stages(route: &Route) -> Vec<Stage> {
    let mut stages = Vec::new();

    if route.enable_cors_origin_all {
        stages.push(Stage::CorsAllowAll);
    }

    if !route.query_params.is_empty() {
        stages.push(Stage::RequireQuery(route.query_params.clone()));
    }

    if route.requires_authorisation {
        stages.push(Stage::Authorisation);
    }

    if route.access_level > 0 {
        stages.push(Stage::AccessLevel {
            provided: route.access_level,
            required: route.access_level,
        });
    }

    // Content type comes after the gates so rejections keep their own.
    if route.has_json_response {
        stages.push(Stage::ContentType(JSON_CONTENT_TYPE.to_string()));
    } else {
        stages.push(Stage::DefaultContentType(HTML_CONTENT_TYPE.to_string()));
    }

    stages
}

/// One-line description used when the route is registered.
pub fn describe(route: &Route) -> String {
    let mut message = format!(
        "Setting up {} {} Route: {}, on path: {}",
        if route.requires_authorisation { "AUTHENTICATED" } else { "UNAUTHENTICATED" },
        route.request_method,
        route.name,
        route.path
    );

    if route.access_level > 0 {
        message.push_str(&format!(" WITH access level {}", route.access_level));
    } else {
        message.push_str(" WITHOUT an access level");
    }

    if route.enable_cors_origin_all {
        message.push_str(" with Access-Control-Allow-Origin: *");
    }

    if !route.query_params.is_empty() {
        message.push_str(&format!(" has query params: {:?}", route.query_params));
    }

    message
}
