//! Application configuration loaded from environment variables.

use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderValue;
use serde::Deserialize;
use strum::{Display, EnumString};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Application Metadata ===
    /// Title shown in the OpenAPI document.
    #[serde(default = "default_app_title")]
    pub app_title: String,

    /// API version shown in the OpenAPI document.
    #[serde(default = "default_app_version")]
    pub app_version: String,

    // === Server Configuration ===
    /// Interface to bind.
    #[serde(default = "default_http_host")]
    pub http_host: String,

    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Serve `/openapi.json` (and `/docs` with the swagger-ui feature).
    #[serde(default = "default_true")]
    pub docs_enabled: bool,

    /// Install the Prometheus recorder and serve `/metrics`.
    #[serde(default)]
    pub metrics_enabled: bool,

    /// Origins allowed by CORS. Empty disables the layer, `*` allows any.
    #[serde(default)]
    pub cors_allow_origins: Vec<String>,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_app_title() -> String {
    "TEOS API Orchestrator".to_string()
}

fn default_app_version() -> String {
    "0.1.0".to_string()
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_title: default_app_title(),
            app_version: default_app_version(),
            http_host: default_http_host(),
            port: default_port(),
            docs_enabled: default_true(),
            metrics_enabled: false,
            cors_allow_origins: Vec::new(),
            rust_log: default_log_level(),
            log_format: LogFormat::default(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.app_title.trim().is_empty() {
            return Err("APP_TITLE must not be empty".to_string());
        }

        if self.http_host.parse::<IpAddr>().is_err() {
            return Err(format!("HTTP_HOST '{}' is not an IP address", self.http_host));
        }

        for origin in &self.cors_allow_origins {
            if origin != "*" && HeaderValue::from_str(origin).is_err() {
                return Err(format!("CORS_ALLOW_ORIGINS entry '{}' is not a valid origin", origin));
            }
        }

        Ok(())
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, String> {
        let ip: IpAddr = self
            .http_host
            .parse()
            .map_err(|_| format!("HTTP_HOST '{}' is not an IP address", self.http_host))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Build the CORS layer, if any origins are configured.
    pub fn cors_layer(&self) -> Option<CorsLayer> {
        if self.cors_allow_origins.is_empty() {
            return None;
        }

        let origin = if self.cors_allow_origins.iter().any(|o| o == "*") {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(
                self.cors_allow_origins
                    .iter()
                    .filter_map(|o| HeaderValue::from_str(o).ok()),
            )
        };

        Some(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    }
}
