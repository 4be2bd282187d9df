//! Prometheus metrics for request tracking.
//!
//! Metrics go through the `metrics` facade. Until a recorder is installed
//! with [`install_recorder`] every call here is a no-op.

use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// HTTP requests counter metric name.
pub const METRIC_HTTP_REQUESTS: &str = "http_requests_total";
/// HTTP request duration metric name.
pub const METRIC_HTTP_REQUEST_DURATION: &str = "http_request_duration_ms";
/// Mounted routes gauge metric name.
pub const METRIC_ROUTES_MOUNTED: &str = "routes_mounted";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(METRIC_HTTP_REQUESTS, "Total number of HTTP requests dispatched");
    describe_histogram!(
        METRIC_HTTP_REQUEST_DURATION,
        "HTTP request handling latency in milliseconds"
    );
    describe_gauge!(METRIC_ROUTES_MOUNTED, "Number of routes in the frozen route table");

    debug!("Metrics initialized");
}

/// Install the global Prometheus recorder and return a handle for rendering.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// Handle backed by a recorder that is not installed globally.
///
/// Enough to register `/metrics` when only the route table is wanted.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

/// Record one dispatched request.
pub fn record_http_request(method: &str, path: &str, status: u16, start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    counter!(
        METRIC_HTTP_REQUESTS,
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        METRIC_HTTP_REQUEST_DURATION,
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(latency_ms);
}

/// Set the mounted routes gauge.
pub fn set_routes_mounted(count: usize) {
    gauge!(METRIC_ROUTES_MOUNTED).set(count as f64);
}

/// Middleware recording count and latency per matched route.
///
/// Must be installed with `route_layer` so `MatchedPath` is available.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());

    let response = next.run(request).await;
    record_http_request(&method, &path, response.status().as_u16(), start);
    response
}
