//! Mounting phase of the application host.

use std::collections::{BTreeMap, HashMap, HashSet};

use axum::extract::State;
use axum::http::Method;
use axum::routing::{MethodFilter, MethodRouter};
use axum::{middleware, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use super::serving::{HostInfo, ServingHost};
use super::{not_found, openapi, RouteInfo};
use crate::error::HostError;
use crate::metrics;
use crate::routing::{RouteDef, RouteSource, RouterModule};

/// Path of the Prometheus scrape endpoint.
pub const METRICS_PATH: &str = "/metrics";

#[cfg(feature = "swagger-ui")]
const SWAGGER_UI_PATH: &str = "/docs";

/// Route table under construction.
///
/// Every route is keyed by method and path pattern; a second registration of
/// the same key is rejected, never overwritten.
pub struct AppHost {
    title: String,
    version: String,
    docs_enabled: bool,
    metrics: Option<PrometheusHandle>,
    cors: Option<CorsLayer>,
    routers: Vec<String>,
    routes: Vec<RouteInfo>,
    owners: HashMap<(Method, String), String>,
    spellings: HashMap<String, String>,
    endpoints: BTreeMap<String, MethodRouter>,
}

impl AppHost {
    /// Create a host with no routes mounted.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: "0.1.0".to_string(),
            docs_enabled: true,
            metrics: None,
            cors: None,
            routers: Vec::new(),
            routes: Vec::new(),
            owners: HashMap::new(),
            spellings: HashMap::new(),
            endpoints: BTreeMap::new(),
        }
    }

    /// Set the API version reported in the OpenAPI document.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Serve the OpenAPI document (default on).
    pub fn with_docs(mut self, enabled: bool) -> Self {
        self.docs_enabled = enabled;
        self
    }

    /// Serve Prometheus metrics from this recorder handle.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Wrap the dispatcher in a CORS layer.
    pub fn with_cors(mut self, cors: CorsLayer) -> Self {
        self.cors = Some(cors);
        self
    }

    /// Host title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Route table in mount order.
    pub fn routes(&self) -> &[RouteInfo] {
        &self.routes
    }

    /// Names of mounted routers in mount order.
    pub fn routers(&self) -> &[String] {
        &self.routers
    }

    /// Merge a router's routes into the table.
    ///
    /// Either every route of `source` is added or none is.
    pub fn mount<R: RouteSource>(&mut self, source: R) -> Result<(), HostError> {
        let name = source.name().to_string();
        let prefix = source.prefix().to_string();
        validate_prefix(&name, &prefix)?;

        let defs = source.into_routes();
        let mut staged = Vec::with_capacity(defs.len());
        let mut batch_keys = HashSet::new();
        let mut batch_spellings: HashMap<String, String> = HashMap::new();

        for def in defs {
            let path = join_path(&name, &prefix, def.path())?;
            let filter = MethodFilter::try_from(def.method().clone()).map_err(|_| {
                HostError::UnsupportedMethod {
                    router: name.clone(),
                    method: def.method().to_string(),
                }
            })?;
            let pattern = pattern_key(&path);

            let spelled = self
                .spellings
                .get(&pattern)
                .or_else(|| batch_spellings.get(&pattern))
                .cloned();
            if let Some(existing) = spelled {
                if existing != path {
                    return Err(HostError::AmbiguousPath {
                        router: name,
                        path,
                        existing,
                    });
                }
            }

            let overlapping = self
                .spellings
                .iter()
                .chain(batch_spellings.iter())
                .find(|(other, _)| param_meets_catch_all(&pattern, other))
                .map(|(_, spelling)| spelling.clone());
            if let Some(existing) = overlapping {
                return Err(HostError::AmbiguousPath {
                    router: name,
                    path,
                    existing,
                });
            }

            let key = (def.method().clone(), pattern.clone());
            let previous_owner = self.owners.get(&key).cloned().or_else(|| {
                batch_keys.contains(&key).then(|| name.clone())
            });
            if let Some(existing) = previous_owner {
                error!(router = %name, method = %def.method(), path = %path, owner = %existing, "Route conflict");
                return Err(HostError::RouteConflict {
                    method: def.method().to_string(),
                    path,
                    existing,
                    incoming: name,
                });
            }

            batch_keys.insert(key);
            batch_spellings.insert(pattern, path.clone());
            staged.push((path, filter, def));
        }

        let count = staged.len();
        for (path, filter, def) in staged {
            self.commit(&name, path, filter, def);
        }
        self.routers.push(name.clone());

        info!(router = %name, prefix = %prefix, routes = count, "Router mounted");
        Ok(())
    }

    fn commit(&mut self, router: &str, path: String, filter: MethodFilter, def: RouteDef) {
        let pattern = pattern_key(&path);
        self.owners
            .insert((def.method().clone(), pattern.clone()), router.to_string());
        self.spellings.entry(pattern).or_insert_with(|| path.clone());
        self.routes.push(RouteInfo {
            method: def.method().clone(),
            path: path.clone(),
            router: router.to_string(),
            summary: def.summary_text().map(str::to_owned),
            include_in_schema: def.include_in_schema(),
        });
        debug!(method = %def.method(), path = %path, router = %router, "Route registered");

        let endpoint = def.into_method_router(filter);
        let merged = match self.endpoints.remove(&path) {
            // Methods are disjoint here, so merge cannot panic.
            Some(existing) => existing.merge(endpoint),
            None => endpoint,
        };
        self.endpoints.insert(path, merged);
    }

    /// Fail if any mounted route lives under `prefix`.
    #[cfg(feature = "swagger-ui")]
    fn reserve_prefix(&self, owner: &str, prefix: &str) -> Result<(), HostError> {
        let nested = format!("{}/", prefix);
        match self
            .routes
            .iter()
            .find(|r| r.path == prefix || r.path.starts_with(&nested))
        {
            Some(route) => Err(HostError::RouteConflict {
                method: route.method.to_string(),
                path: route.path.clone(),
                existing: route.router.clone(),
                incoming: owner.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// End the mounting phase.
    ///
    /// Host-owned routes (OpenAPI document, metrics) are mounted here and go
    /// through the same conflict checks as user routers.
    pub fn freeze(mut self) -> Result<ServingHost, HostError> {
        if self.docs_enabled {
            let document = openapi::build(&self.title, &self.version, &self.routes).to_json()?;
            self.mount(openapi::docs_router(document))?;
            #[cfg(feature = "swagger-ui")]
            self.reserve_prefix("swagger-ui", SWAGGER_UI_PATH)?;
        }

        if let Some(handle) = self.metrics.clone() {
            self.mount(metrics_router(handle))?;
        }

        let AppHost {
            title,
            version,
            docs_enabled,
            cors,
            routes,
            endpoints,
            ..
        } = self;

        let has_routes = !endpoints.is_empty();
        let mut router = Router::new();
        for (path, endpoint) in endpoints {
            router = router.route(&path, endpoint.fallback(not_found));
        }
        if has_routes {
            router = router.route_layer(middleware::from_fn(metrics::track_requests));
        }

        #[cfg(feature = "swagger-ui")]
        if docs_enabled {
            router = router.merge(
                utoipa_swagger_ui::SwaggerUi::new(SWAGGER_UI_PATH)
                    .config(utoipa_swagger_ui::Config::from(openapi::OPENAPI_PATH)),
            );
        }
        #[cfg(not(feature = "swagger-ui"))]
        let _ = docs_enabled;

        let mut router = router
            .fallback(not_found)
            .layer(TraceLayer::new_for_http());
        if let Some(cors) = cors {
            router = router.layer(cors);
        }

        metrics::set_routes_mounted(routes.len());
        info!(title = %title, routes = routes.len(), "Route table frozen");

        Ok(ServingHost::new(
            HostInfo {
                title,
                version,
                routes,
            },
            router,
        ))
    }
}

impl std::fmt::Debug for AppHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppHost")
            .field("title", &self.title)
            .field("version", &self.version)
            .field("routers", &self.routers)
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}

fn metrics_router(handle: PrometheusHandle) -> RouterModule {
    RouterModule::new("metrics").route(
        RouteDef::with_state(Method::GET, METRICS_PATH, render_metrics, handle).hidden(),
    )
}

async fn render_metrics(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}

fn validate_prefix(router: &str, prefix: &str) -> Result<(), HostError> {
    if prefix.is_empty() {
        return Ok(());
    }

    let reason = if !prefix.starts_with('/') {
        "must start with '/'"
    } else if prefix.ends_with('/') {
        "must not end with '/'"
    } else {
        return Ok(());
    };

    Err(HostError::InvalidPrefix {
        router: router.to_string(),
        prefix: prefix.to_string(),
        reason,
    })
}

fn join_path(router: &str, prefix: &str, path: &str) -> Result<String, HostError> {
    if path.is_empty() {
        if prefix.is_empty() {
            return Err(HostError::InvalidPath {
                router: router.to_string(),
                path: path.to_string(),
                reason: "empty path needs a router prefix",
            });
        }
        return Ok(prefix.to_string());
    }

    if !path.starts_with('/') {
        return Err(HostError::InvalidPath {
            router: router.to_string(),
            path: path.to_string(),
            reason: "must start with '/'",
        });
    }

    Ok(format!("{}{}", prefix, path))
}

/// Path with parameter names erased: `/a/:id` and `/a/:name` share a key.
fn pattern_key(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.starts_with(':') {
                ":"
            } else if segment.starts_with('*') {
                "*"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Whether two pattern keys put `:` against `*` at the same segment after an
/// identical lead. The matcher cannot hold both.
fn param_meets_catch_all(a: &str, b: &str) -> bool {
    for (left, right) in a.split('/').zip(b.split('/')) {
        match (left, right) {
            (":", "*") | ("*", ":") => return true,
            _ if left == right => continue,
            _ => return false,
        }
    }
    false
}
