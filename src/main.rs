//! TEOS API Orchestrator entry point.

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

use teos_orchestrator::api::AppState;
use teos_orchestrator::app::assemble;
use teos_orchestrator::config::{Config, LogFormat};
use teos_orchestrator::metrics;
use teos_orchestrator::utils::shutdown_signal;
use teos_orchestrator::OrchestratorError;

/// TEOS API Orchestrator.
#[derive(Parser, Debug)]
#[command(name = "teos-orchestrator")]
#[command(about = "HTTP host for the TEOS API routers")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log output format (pretty or json).
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve HTTP requests (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Print the route table and exit.
    Routes,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Configuration is needed before logging to pick the format; errors are
    // reported after the subscriber is up.
    let config = Config::load();

    // Initialize logging
    let filter = if args.verbose || config.as_ref().map(|c| c.verbose).unwrap_or(false) {
        EnvFilter::new("teos_orchestrator=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                config
                    .as_ref()
                    .map(|c| c.rust_log.as_str())
                    .unwrap_or("info"),
            )
        })
    };

    let format = args
        .log_format
        .or_else(|| config.as_ref().ok().map(|c| c.log_format))
        .unwrap_or_default();
    let fmt_layer = match format {
        LogFormat::Json => fmt::layer().json().boxed(),
        LogFormat::Pretty => fmt::layer().boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .init();

    let config = config.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        OrchestratorError::from(e)
    })?;

    // Handle subcommands
    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(config),
        Some(Command::Routes) => cmd_routes(config),
        Some(Command::Serve { port }) => cmd_serve(config, port).await,
        None => cmd_serve(config, None).await,
    }
}

/// Check configuration validity.
fn cmd_check_config(config: Config) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("TEOS API ORCHESTRATOR - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(OrchestratorError::InvalidConfig(e).into());
        }
    }

    print!("Assembling route table... ");
    let metrics_handle = config.metrics_enabled.then(metrics::detached_handle);
    match assemble(&config, AppState::new(), metrics_handle) {
        Ok(serving) => {
            println!("OK");
            println!("  Routes: {}", serving.routes().len());
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Route table assembly failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Title: {}", config.app_title);
    println!("  Version: {}", config.app_version);
    println!("  Bind: {}:{}", config.http_host, config.port);
    println!("  Docs: {}", if config.docs_enabled { "Enabled" } else { "Disabled" });
    println!("  Metrics: {}", if config.metrics_enabled { "Enabled" } else { "Disabled" });
    if config.cors_allow_origins.is_empty() {
        println!("  CORS: Disabled");
    } else {
        println!("  CORS: {}", config.cors_allow_origins.join(", "));
    }
    println!("  Log Format: {}", config.log_format);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Print the frozen route table.
fn cmd_routes(config: Config) -> anyhow::Result<()> {
    let metrics_handle = config.metrics_enabled.then(metrics::detached_handle);
    let serving = assemble(&config, AppState::new(), metrics_handle)?;

    println!("{} v{}", serving.title(), serving.version());
    for route in serving.routes() {
        println!(
            "  {:<8} {:<24} {}",
            route.method.as_str(),
            route.path,
            route.router
        );
    }

    Ok(())
}

/// Serve HTTP until a shutdown signal arrives.
async fn cmd_serve(mut config: Config, port_override: Option<u16>) -> anyhow::Result<()> {
    if let Some(port) = port_override {
        config.port = port;
    }

    // Validate configuration
    let addr = config.bind_addr().map_err(|e| {
        error!("Invalid configuration: {}", e);
        OrchestratorError::InvalidConfig(e)
    })?;

    info!("Title: {}", config.app_title);
    info!("Docs: {}", if config.docs_enabled { "enabled" } else { "disabled" });

    let metrics_handle = if config.metrics_enabled {
        let handle = metrics::install_recorder().map_err(OrchestratorError::from)?;
        info!("Prometheus metrics enabled");
        Some(handle)
    } else {
        None
    };

    // Create app state
    let app_state = AppState::new();

    // Validate, mount routers and freeze; conflicts abort startup here
    let serving = assemble(&config, app_state.clone(), metrics_handle).map_err(|e| {
        error!("Failed to assemble route table: {}", e);
        e
    })?;
    info!("Configuration loaded successfully");

    // Start HTTP server
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    app_state.set_ready(true);

    let readiness = app_state.clone();
    serving
        .serve(listener, async move {
            shutdown_signal().await;
            readiness.set_ready(false);
        })
        .await?;

    info!("Shutdown complete");
    Ok(())
}
