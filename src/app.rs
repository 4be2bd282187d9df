//! Application assembly.

use metrics_exporter_prometheus::PrometheusHandle;

use crate::api::{health_router, AppState};
use crate::config::Config;
use crate::error::{HostError, OrchestratorError, Result};
use crate::host::{AppHost, ServingHost};

/// Construct the host described by `config` and mount the application routers.
///
/// The host is returned still in the mounting phase so the caller can attach
/// process-wide pieces (metrics recorder) before freezing.
pub fn build_host(config: &Config, state: AppState) -> std::result::Result<AppHost, HostError> {
    let mut host = AppHost::new(config.app_title.clone())
        .with_version(config.app_version.clone())
        .with_docs(config.docs_enabled);

    if let Some(cors) = config.cors_layer() {
        host = host.with_cors(cors);
    }

    host.mount(health_router(state))?;
    Ok(host)
}

/// Validate `config`, mount the routers and freeze the route table.
///
/// `metrics` is attached before freezing so `/metrics` is part of the table.
pub fn assemble(
    config: &Config,
    state: AppState,
    metrics: Option<PrometheusHandle>,
) -> Result<ServingHost> {
    config.validate().map_err(OrchestratorError::InvalidConfig)?;

    let mut host = build_host(config, state)?;
    if let Some(handle) = metrics {
        host = host.with_metrics(handle);
    }

    Ok(host.freeze()?)
}
