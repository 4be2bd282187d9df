//! Serving phase of the application host.

use std::future::Future;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::Response;
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceExt;
use tracing::info;

use super::RouteInfo;

/// Metadata fixed when the host is frozen.
#[derive(Debug)]
pub(crate) struct HostInfo {
    pub(crate) title: String,
    pub(crate) version: String,
    pub(crate) routes: Vec<RouteInfo>,
}

/// Frozen host. Cheap to clone; every clone dispatches over the same table.
#[derive(Debug, Clone)]
pub struct ServingHost {
    info: Arc<HostInfo>,
    router: Router,
}

impl ServingHost {
    pub(crate) fn new(info: HostInfo, router: Router) -> Self {
        Self {
            info: Arc::new(info),
            router,
        }
    }

    /// Host title.
    pub fn title(&self) -> &str {
        &self.info.title
    }

    /// API version.
    pub fn version(&self) -> &str {
        &self.info.version
    }

    /// Frozen route table, including host-owned routes.
    pub fn routes(&self) -> &[RouteInfo] {
        &self.info.routes
    }

    /// Dispatch one request to its handler, or to the not-found response.
    pub async fn dispatch(&self, request: Request) -> Response {
        match self.router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        }
    }

    /// Accept connections on `listener` until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Ok(addr) = listener.local_addr() {
            info!("{} listening on {}", self.info.title, addr);
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
