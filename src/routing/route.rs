//! Route descriptors.

use std::convert::Infallible;

use axum::{
    body::Body,
    handler::Handler,
    http::{Method, Request},
    response::Response,
};
use tower::util::BoxCloneSyncService;

/// Type-erased request handler stored on a route.
pub type RouteHandler = BoxCloneSyncService<Request<Body>, Response, Infallible>;

/// Static metadata for one endpoint plus the middleware it needs.
///
/// Built with [`Route::new`] or [`Route::static_files`] and the chained
/// setters below. The composer only reads it.
#[derive(Clone)]
pub struct Route {
    pub name: String,
    pub description: String,
    pub path: String,
    pub handler: Option<RouteHandler>,
    pub request_method: Method,
    /// Content type forced on static responses. Empty means "guess".
    pub content_type: String,
    pub is_static_path: bool,
    pub requires_authorisation: bool,
    pub requires_authentication: bool,
    pub access_level: u32,
    pub has_json_response: bool,
    pub enable_cors_origin_all: bool,
    /// Query parameters that must be present for the route to match.
    pub query_params: Vec<String>,
}

impl Route {
    /// A route served by `handler`.
    pub fn new<H, T>(name: impl Into<String>, method: Method, path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        let mut route = Self::empty(name, method, path);
        route.handler = Some(BoxCloneSyncService::new(handler.with_state(())));
        route
    }

    /// Files under `<static_root>/<path>` served at `/<path>/`.
    pub fn static_files(name: impl Into<String>, path: impl Into<String>) -> Self {
        let mut route = Self::empty(name, Method::GET, path);
        route.is_static_path = true;
        route
    }

    fn empty(name: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            path: path.into(),
            handler: None,
            request_method: method,
            content_type: String::new(),
            is_static_path: false,
            requires_authorisation: false,
            requires_authentication: false,
            access_level: 0,
            has_json_response: false,
            enable_cors_origin_all: false,
            query_params: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.request_method = method;
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Require a valid token.
    pub fn authorised(mut self) -> Self {
        self.requires_authorisation = true;
        self
    }

    pub fn authenticated(mut self) -> Self {
        self.requires_authentication = true;
        self
    }

    pub fn access_level(mut self, level: u32) -> Self {
        self.access_level = level;
        self
    }

    pub fn json(mut self) -> Self {
        self.has_json_response = true;
        self
    }

    /// Add `Access-Control-Allow-Origin: *` to responses.
    pub fn cors_allow_all(mut self) -> Self {
        self.enable_cors_origin_all = true;
        self
    }

    pub fn query_params<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query_params = names.into_iter().map(Into::into).collect();
        self
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("request_method", &self.request_method)
            .field("is_static_path", &self.is_static_path)
            .field("requires_authorisation", &self.requires_authorisation)
            .field("access_level", &self.access_level)
            .field("has_json_response", &self.has_json_response)
            .field("enable_cors_origin_all", &self.enable_cors_origin_all)
            .field("query_params", &self.query_params)
            .finish_non_exhaustive()
    }
}
