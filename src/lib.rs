//! TEOS API Orchestrator.
//!
//! An HTTP host that mounts routers and dispatches requests to them. Startup
//! runs in two phases:
//!
//! ```text
//! AppHost::new(title)      mounting: routers added, conflicts rejected
//!     .mount(router)?
//!     .freeze()?       ->  ServingHost: table frozen, requests dispatched
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`routing`]: Mountable route collections
//! - [`host`]: Route table, conflict detection and dispatch
//! - [`api`]: Health and readiness endpoints
//! - [`app`]: Wiring of the above from configuration
//! - [`metrics`]: Prometheus request metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod host;
pub mod metrics;
pub mod routing;
pub mod utils;

pub use config::Config;
pub use error::{HostError, OrchestratorError, Result};
pub use host::{AppHost, ServingHost};
pub use routing::{RouteDef, RouteSource, RouterModule};
