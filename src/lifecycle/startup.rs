//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and metrics
//! - Build the coordinator and HTTP server
//! - Bind the listener, start the config watcher, serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::validation::validate_config;
use crate::config::watcher::ConfigWatcher;
use crate::config::{load_config, ConfigError, ServiceConfig};
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::spawn_signal_handler;
use crate::lookup::BuildError;
use crate::observability::{logging, metrics};

/// Options supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    /// TOML config file; defaults apply when absent.
    pub config_path: Option<PathBuf>,
    /// Overrides `listener.bind_address`.
    pub bind_address: Option<String>,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to initialize logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("failed to watch config file: {0}")]
    Watch(#[from] notify::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolve the effective configuration from `options`.
pub fn resolve_config(options: &StartupOptions) -> Result<ServiceConfig, ConfigError> {
    let mut config = match &options.config_path {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = &options.bind_address {
        config.listener.bind_address = bind.clone();
        validate_config(&config).map_err(ConfigError::Validation)?;
    }
    Ok(config)
}

/// Start the resolver and serve until SIGINT/SIGTERM.
pub async fn run(options: StartupOptions) -> Result<(), StartupError> {
    let config = resolve_config(&options)?;

    logging::init_logging(&config.observability)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config_path = ?options.config_path,
        bind_address = %config.listener.bind_address,
        race_timeout_ms = config.race.timeout_ms,
        policy = ?config.race.policy,
        "cep-resolver starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(error = %e, "Failed to parse metrics address"),
        }
    }

    let server = HttpServer::new(config.clone())?;
    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    // The watcher handle must outlive the server.
    let (_watcher, config_updates) = match &options.config_path {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    spawn_signal_handler(&shutdown);

    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
