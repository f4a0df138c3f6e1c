//! fritzmon - version 0.1.0
//!
//! WAN bandwidth monitor for FRITZ!Box routers with tracing logging.
//! This is the main entry point that starts the poller, the HTTP read
//! surface and handles subcommands.

mod cli;
mod commands;
mod config;
mod handlers;
mod metrics;
mod state;

use axum::{routing::get, Router};
use clap::Parser;
use fritzmon::{spawn_poller, MetricStore, PollStats, Scheduler, SoapClient};
use prometheus::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::{net::TcpListener, signal};
use tracing::{debug, error, info, Level};

use cli::{Args, Commands, LogLevel};
use commands::{command_config, command_poll};
use config::{
    resolve_config, show_config, validate_effective_config, Config, DEFAULT_BIND_ADDR, DEFAULT_PORT,
};
use handlers::{health_handler, metrics_handler, root_handler, series_handler};
use metrics::MonitorMetrics;
use state::AppState;

/// Initializes tracing logging subsystem with configured log level.
fn setup_logging(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let level = config.log_level()?;
    let log_level = match level {
        LogLevel::Off => Level::ERROR,
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Logging initialized with level: {:?}", level);
    Ok(())
}

/// Helper function to load and validate configuration.
/// Exits the process with error code 1 if validation fails.
fn load_validated_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    Ok(config)
}

/// Resolves when SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }
}

/// Main application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format);
    }

    // Handle subcommands
    if let Some(command) = &args.command {
        return match command {
            Commands::Config {
                output,
                format,
                commented,
            } => command_config(output.clone(), format.clone(), *commented),

            Commands::Poll {
                action,
                iterations,
                format,
            } => {
                let config = load_validated_config(&args)?;
                setup_logging(&config)?;
                command_poll((*action).into(), *iterations, format.clone(), &config).await?;
                Ok(())
            }
        };
    }

    let config = load_validated_config(&args)?;

    setup_logging(&config)?;

    info!("Starting fritzmon");

    // Initialize Prometheus metrics registry
    let registry = Registry::new();
    let metrics = MonitorMetrics::new(&registry)?;
    debug!("All metrics registered successfully");

    let client = Arc::new(SoapClient::new(config.soap_settings())?);
    let store = Arc::new(MetricStore::new());
    let poll_stats = Arc::new(PollStats::new());

    let mut scheduler = Scheduler::new();
    let series = spawn_poller(
        &mut scheduler,
        client,
        store.clone(),
        poll_stats.clone(),
        Arc::new(metrics),
        config.poller_settings(),
    );
    info!("Poller started with {} periodic tasks", scheduler.len());

    if config.enable_http.unwrap_or(true) {
        let bind_ip_str = config.bind.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        let port = config.port.unwrap_or(DEFAULT_PORT);
        let addr: SocketAddr = format!("{}:{}", bind_ip_str, port).parse()?;

        let state = Arc::new(AppState {
            registry,
            store,
            series,
            poll_stats,
            config: Arc::new(config.clone()),
            start_time: Instant::now(),
        });

        let app = Router::new()
            .route("/", get(root_handler))
            .route("/series", get(series_handler))
            .route("/metrics", get(metrics_handler))
            .route("/health", get(health_handler))
            .with_state(state);

        let listener = TcpListener::bind(addr).await?;
        info!("fritzmon listening on http://{}:{}", bind_ip_str, port);

        let server = axum::serve(listener, app);

        tokio::select! {
            result = server => {
                if let Err(e) = result {
                    error!("Server error: {}", e);
                    scheduler.shutdown().await;
                    return Err(e.into());
                }
            }
            _ = shutdown_signal() => {
                info!("Shutdown signal received, exiting...");
            }
        }
    } else {
        info!("HTTP read surface disabled, polling only");
        shutdown_signal().await;
    }

    for (task, runs) in scheduler.shutdown().await {
        debug!("{} completed {} run(s)", task, runs);
    }

    info!("fritzmon stopped gracefully");
    Ok(())
}
