//! Mountable route collections.
//!
//! A router is anything that can enumerate `(method, path, handler)` triples
//! through [`RouteSource`]. [`RouterModule`] is the concrete implementation the
//! crate's own routers use.

use std::fmt;

use axum::handler::Handler;
use axum::http::Method;
use axum::routing::{on, MethodFilter, MethodRouter};

type Endpoint = Box<dyn FnOnce(MethodFilter) -> MethodRouter + Send>;

/// A single route declaration.
pub struct RouteDef {
    method: Method,
    path: String,
    summary: Option<String>,
    include_in_schema: bool,
    endpoint: Endpoint,
}

impl RouteDef {
    /// Declare a route served by a stateless handler.
    pub fn new<H, T>(method: Method, path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        Self::from_endpoint(method, path.into(), Box::new(move |filter| on(filter, handler)))
    }

    /// Declare a route whose handler extracts `State<S>`.
    pub fn with_state<H, T, S>(method: Method, path: impl Into<String>, handler: H, state: S) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
        S: Clone + Send + Sync + 'static,
    {
        Self::from_endpoint(
            method,
            path.into(),
            Box::new(move |filter| on(filter, handler).with_state(state)),
        )
    }

    fn from_endpoint(method: Method, path: String, endpoint: Endpoint) -> Self {
        Self {
            method,
            path,
            summary: None,
            include_in_schema: true,
            endpoint,
        }
    }

    /// Attach a one-line summary for the OpenAPI document.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Leave this route out of the OpenAPI document.
    pub fn hidden(mut self) -> Self {
        self.include_in_schema = false;
        self
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path relative to the router prefix.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// OpenAPI summary, if any.
    pub fn summary_text(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Whether the route appears in the OpenAPI document.
    pub fn include_in_schema(&self) -> bool {
        self.include_in_schema
    }

    pub(crate) fn into_method_router(self, filter: MethodFilter) -> MethodRouter {
        (self.endpoint)(filter)
    }
}

impl fmt::Debug for RouteDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDef")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("summary", &self.summary)
            .field("include_in_schema", &self.include_in_schema)
            .finish_non_exhaustive()
    }
}

/// Something the host can mount.
pub trait RouteSource {
    /// Name used in logs, conflict errors and OpenAPI tags.
    fn name(&self) -> &str;

    /// Prefix prepended to every route path. Empty for none.
    fn prefix(&self) -> &str {
        ""
    }

    /// Consume the source, yielding its routes in declaration order.
    fn into_routes(self) -> Vec<RouteDef>;
}

/// A named, prefixable collection of routes.
#[derive(Debug)]
pub struct RouterModule {
    name: String,
    prefix: String,
    routes: Vec<RouteDef>,
}

impl RouterModule {
    /// Create an empty router.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: String::new(),
            routes: Vec::new(),
        }
    }

    /// Set the mount prefix, e.g. `/api/v1`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Add a prebuilt route.
    pub fn route(mut self, route: RouteDef) -> Self {
        self.routes.push(route);
        self
    }

    /// Add a stateless `GET` route.
    pub fn get<H, T>(self, path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.route(RouteDef::new(Method::GET, path, handler))
    }

    /// Add a stateless `POST` route.
    pub fn post<H, T>(self, path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.route(RouteDef::new(Method::POST, path, handler))
    }

    /// Add a route whose handler extracts `State<S>`.
    pub fn route_with_state<H, T, S>(
        self,
        method: Method,
        path: impl Into<String>,
        handler: H,
        state: S,
    ) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
        S: Clone + Send + Sync + 'static,
    {
        self.route(RouteDef::with_state(method, path, handler, state))
    }

    /// Number of declared routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no routes are declared.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl RouteSource for RouterModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn into_routes(self) -> Vec<RouteDef> {
        self.routes
    }
}
