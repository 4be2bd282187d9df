//! Unified error types for the orchestrator.

use thiserror::Error;

/// Unified error type for the orchestrator.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Route table assembly error.
    #[error("host error: {0}")]
    Host(#[from] HostError),

    /// Prometheus recorder could not be installed.
    #[error("metrics error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while mounting routers or freezing the host.
///
/// All of these are startup errors: a host that produced one never reaches
/// the serving phase.
#[derive(Error, Debug)]
pub enum HostError {
    /// Two routes declare the same method and path.
    #[error("route conflict: {method} {path} from router '{incoming}' is already mounted by '{existing}'")]
    RouteConflict {
        /// HTTP method of the clashing route.
        method: String,
        /// Prefix-joined path of the clashing route.
        path: String,
        /// Router that registered the route first.
        existing: String,
        /// Router whose mount was rejected.
        incoming: String,
    },

    /// Same path pattern spelled with different parameter names.
    #[error("ambiguous path in router '{router}': {path} matches the same requests as mounted path {existing}")]
    AmbiguousPath {
        /// Router whose mount was rejected.
        router: String,
        /// The rejected spelling.
        path: String,
        /// The spelling already mounted.
        existing: String,
    },

    /// Router prefix is malformed.
    #[error("invalid prefix '{prefix}' on router '{router}': {reason}")]
    InvalidPrefix {
        /// Router name.
        router: String,
        /// The offending prefix.
        prefix: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Route path is malformed.
    #[error("invalid path '{path}' on router '{router}': {reason}")]
    InvalidPath {
        /// Router name.
        router: String,
        /// The offending path.
        path: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The dispatcher has no method filter for this method.
    #[error("unsupported method {method} on router '{router}'")]
    UnsupportedMethod {
        /// Router name.
        router: String,
        /// The method.
        method: String,
    },

    /// OpenAPI document could not be rendered.
    #[error("failed to render openapi document: {0}")]
    OpenApi(#[from] serde_json::Error),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_conflict_names_both_routers() {
        let err = HostError::RouteConflict {
            method: "GET".to_string(),
            path: "/health".to_string(),
            existing: "health".to_string(),
            incoming: "status".to_string(),
        };

        let message = err.to_string();
        assert!(message.contains("GET /health"));
        assert!(message.contains("'status'"));
        assert!(message.contains("'health'"));
    }

    #[test]
    fn host_error_converts_into_orchestrator_error() {
        let err: OrchestratorError = HostError::InvalidPath {
            router: "health".to_string(),
            path: "health".to_string(),
            reason: "must start with '/'",
        }
        .into();

        assert!(matches!(err, OrchestratorError::Host(_)));
    }
}
