//! Integration tests for the orchestrator.
//!
//! These tests bind a real listener on 127.0.0.1 and talk to it over HTTP.
//! Run with: cargo test --test integration

use std::net::SocketAddr;

use teos_orchestrator::api::AppState;
use teos_orchestrator::app::build_host;
use teos_orchestrator::config::Config;
use teos_orchestrator::{AppHost, HostError, RouterModule, ServingHost};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct RunningServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl RunningServer {
    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn stop(self) {
        let _ = self.shutdown.send(());
        self.handle.await.unwrap().unwrap();
    }
}

async fn start(serving: ServingHost) -> RunningServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown, signal) = oneshot::channel::<()>();

    let handle = tokio::spawn(serving.serve(listener, async move {
        let _ = signal.await;
    }));

    RunningServer {
        addr,
        shutdown,
        handle,
    }
}

/// The assembled service answers its health check and 404s anything else.
#[tokio::test]
async fn test_health_over_http() {
    let state = AppState::new();
    let serving = build_host(&Config::default(), state.clone())
        .unwrap()
        .freeze()
        .unwrap();
    assert_eq!(serving.title(), "TEOS API Orchestrator");

    let server = start(serving).await;
    let client = reqwest::Client::new();

    let response = client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "status": "ok" }));

    let response = client.get(server.url("/unknown")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "detail": "Not Found" }));

    server.stop().await;
}

/// Readiness follows the flag flipped around serving.
#[tokio::test]
async fn test_readiness_over_http() {
    let state = AppState::new();
    let serving = build_host(&Config::default(), state.clone())
        .unwrap()
        .freeze()
        .unwrap();
    let server = start(serving).await;
    let client = reqwest::Client::new();

    let response = client.get(server.url("/ready")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);

    state.set_ready(true);
    let response = client.get(server.url("/ready")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    server.stop().await;
}

/// The OpenAPI document carries the configured title.
#[tokio::test]
async fn test_openapi_over_http() {
    let serving = build_host(&Config::default(), AppState::new())
        .unwrap()
        .freeze()
        .unwrap();
    let server = start(serving).await;

    let doc: serde_json::Value = reqwest::get(server.url("/openapi.json"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(doc["info"]["title"], "TEOS API Orchestrator");
    assert!(doc["paths"]["/health"]["get"].is_object());
    assert!(doc["paths"]["/ready"]["get"].is_object());

    server.stop().await;
}

/// A second router claiming GET /health stops startup before serving.
#[test]
fn test_conflicting_router_blocks_startup() {
    async fn other() -> &'static str {
        "other"
    }

    let mut host: AppHost = build_host(&Config::default(), AppState::new()).unwrap();
    let err = host
        .mount(RouterModule::new("status").get("/health", other))
        .unwrap_err();

    assert!(matches!(err, HostError::RouteConflict { .. }));
    assert_eq!(host.routes().len(), 2);
}
