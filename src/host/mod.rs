//! Application host: route registry and request dispatch.
//!
//! The host has two phases. [`AppHost`] accepts router mounts and rejects
//! conflicting routes. [`AppHost::freeze`] consumes it and yields a
//! [`ServingHost`], whose route table can no longer change.

pub mod builder;
pub mod openapi;
pub mod serving;

use axum::http::{Method, StatusCode};
use axum::Json;
use serde::Serialize;

pub use builder::AppHost;
pub use serving::ServingHost;

/// One entry of the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    /// HTTP method.
    pub method: Method,
    /// Prefix-joined path.
    pub path: String,
    /// Name of the router that declared the route.
    pub router: String,
    /// OpenAPI summary.
    pub summary: Option<String>,
    /// Whether the route appears in the OpenAPI document.
    pub include_in_schema: bool,
}

/// Error body for unmatched requests.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Human-readable reason.
    pub detail: &'static str,
}

/// Response for any request without an exact method+path match.
pub async fn not_found() -> (StatusCode, Json<ErrorDetail>) {
    (StatusCode::NOT_FOUND, Json(ErrorDetail { detail: "Not Found" }))
}
