//! OpenAPI document generated from the route table.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, Method};
use axum::response::IntoResponse;
use utoipa::openapi::info::InfoBuilder;
use utoipa::openapi::path::{HttpMethod, Operation, OperationBuilder, PathItemBuilder, PathsBuilder};
use utoipa::openapi::response::ResponseBuilder;
use utoipa::openapi::{OpenApi, OpenApiBuilder};

use super::RouteInfo;
use crate::routing::{RouteDef, RouterModule};

/// Path the document is served on.
pub const OPENAPI_PATH: &str = "/openapi.json";

/// Build the document for every route with `include_in_schema`.
pub fn build(title: &str, version: &str, routes: &[RouteInfo]) -> OpenApi {
    let mut operations: BTreeMap<String, Vec<(HttpMethod, Operation)>> = BTreeMap::new();

    for route in routes.iter().filter(|r| r.include_in_schema) {
        let Some(http_method) = http_method(&route.method) else {
            continue;
        };

        let operation = OperationBuilder::new()
            .operation_id(Some(operation_id(route)))
            .summary(route.summary.clone())
            .tag(route.router.clone())
            .response(
                "200",
                ResponseBuilder::new()
                    .description("Successful Response")
                    .build(),
            )
            .build();

        operations
            .entry(openapi_path(&route.path))
            .or_default()
            .push((http_method, operation));
    }

    let paths = operations
        .into_iter()
        .fold(PathsBuilder::new(), |paths, (path, ops)| {
            let item = ops
                .into_iter()
                .fold(PathItemBuilder::new(), |item, (method, op)| {
                    item.operation(method, op)
                })
                .build();
            paths.path(path, item)
        });

    OpenApiBuilder::new()
        .info(InfoBuilder::new().title(title).version(version).build())
        .paths(paths.build())
        .build()
}

/// Router serving a pre-rendered document.
pub fn docs_router(document: String) -> RouterModule {
    RouterModule::new("openapi").route(
        RouteDef::with_state(Method::GET, OPENAPI_PATH, openapi_json, Arc::new(document)).hidden(),
    )
}

async fn openapi_json(State(document): State<Arc<String>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        document.as_str().to_owned(),
    )
}

fn http_method(method: &Method) -> Option<HttpMethod> {
    match *method {
        Method::GET => Some(HttpMethod::Get),
        Method::POST => Some(HttpMethod::Post),
        Method::PUT => Some(HttpMethod::Put),
        Method::DELETE => Some(HttpMethod::Delete),
        Method::OPTIONS => Some(HttpMethod::Options),
        Method::HEAD => Some(HttpMethod::Head),
        Method::PATCH => Some(HttpMethod::Patch),
        Method::TRACE => Some(HttpMethod::Trace),
        _ => None,
    }
}

/// `/modules/:id/*rest` becomes `/modules/{id}/{rest}`.
fn openapi_path(path: &str) -> String {
    path.split('/')
        .map(|segment| match segment.strip_prefix(':').or_else(|| segment.strip_prefix('*')) {
            Some(name) => format!("{{{}}}", name),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// `GET /modules/install` becomes `modules_install_get`.
fn operation_id(route: &RouteInfo) -> String {
    let stem: String = route
        .path
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let stem = stem.trim_matches('_');
    let method = route.method.as_str().to_ascii_lowercase();

    if stem.is_empty() {
        format!("root_{}", method)
    } else {
        format!("{}_{}", stem, method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn route(method: Method, path: &str, include_in_schema: bool) -> RouteInfo {
        RouteInfo {
            method,
            path: path.to_string(),
            router: "health".to_string(),
            summary: Some("Probe".to_string()),
            include_in_schema,
        }
    }

    #[test]
    fn document_carries_title_and_visible_routes() {
        let routes = vec![
            route(Method::GET, "/health", true),
            route(Method::GET, "/metrics", false),
        ];

        let doc = build("TEOS API Orchestrator", "0.1.0", &routes);
        let json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();

        assert_eq!(json["info"]["title"], "TEOS API Orchestrator");
        assert_eq!(json["info"]["version"], "0.1.0");
        assert_eq!(json["paths"]["/health"]["get"]["operationId"], "health_get");
        assert_eq!(json["paths"]["/health"]["get"]["tags"][0], "health");
        assert!(json["paths"].get("/metrics").is_none());
    }

    #[test]
    fn methods_on_one_path_share_an_item() {
        let routes = vec![
            route(Method::GET, "/modules/:id", true),
            route(Method::DELETE, "/modules/:id", true),
        ];

        let doc = build("t", "1", &routes);
        let json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();

        let item = &json["paths"]["/modules/{id}"];
        assert!(item.get("get").is_some());
        assert!(item.get("delete").is_some());
    }

    #[test]
    fn path_parameters_use_braces() {
        assert_eq!(openapi_path("/modules/:id/*rest"), "/modules/{id}/{rest}");
        assert_eq!(openapi_path("/health"), "/health");
    }

    #[test]
    fn operation_id_for_root() {
        assert_eq!(operation_id(&route(Method::GET, "/", true)), "root_get");
        assert_eq!(
            operation_id(&route(Method::POST, "/modules/install", true)),
            "modules_install_post"
        );
    }
}
