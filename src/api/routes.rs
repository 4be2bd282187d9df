//! HTTP API route definitions.

use axum::http::Method;

use super::handlers::{health, ready, AppState};
use crate::routing::{RouteDef, RouterModule};

/// Create the health router: liveness and readiness probes.
pub fn health_router(state: AppState) -> RouterModule {
    RouterModule::new("health")
        .route(RouteDef::new(Method::GET, "/health", health).summary("Liveness probe"))
        .route(
            RouteDef::with_state(Method::GET, "/ready", ready, state).summary("Readiness probe"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::AppHost;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use pretty_assertions::assert_eq;

    fn serve(state: AppState) -> crate::host::ServingHost {
        let mut host = AppHost::new("TEOS API Orchestrator");
        host.mount(health_router(state)).unwrap();
        host.freeze().unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let app = serve(AppState::new());

        let response = app
            .dispatch(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], br#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn ready_endpoint_returns_503_when_not_ready() {
        let app = serve(AppState::new());

        let response = app
            .dispatch(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn ready_endpoint_returns_200_when_ready() {
        let state = AppState::new();
        let app = serve(state.clone());
        state.set_ready(true);

        let response = app
            .dispatch(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], br#"{"ready":true}"#);
    }

    #[test]
    fn health_router_declares_both_probes() {
        let mut host = AppHost::new("t");
        host.mount(health_router(AppState::new())).unwrap();

        let paths: Vec<_> = host.routes().iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/health", "/ready"]);
    }
}
