//! HTTP API module for health endpoints.

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::health_router;
