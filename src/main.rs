//! Login Service
//!
//! ```text
//!     Client Request   ┌──────────────────────────────────────────────┐
//!     ─────────────────┼─▶ request ID → trace → timeout → body limit   │
//!                      │        │                                     │
//!                      │        ▼                                     │
//!                      │   /api/login      /api/register    /health   │
//!                      │        │               │                     │
//!                      │        ▼               ▼                     │
//!                      │   CredentialStore (swappable, in memory)     │
//!     Client Response  │        │                                     │
//!     ◀────────────────┼── {"message": ...} + status                  │
//!                      │                                              │
//!                      │  config (+ watcher) · logging · metrics      │
//!                      │  lifecycle: signals → graceful shutdown      │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use login_service::config::{load_config, ConfigWatcher, ServiceConfig};
use login_service::lifecycle::Shutdown;
use login_service::observability::{logging, metrics};
use login_service::ApiServer;

#[derive(Parser)]
#[command(name = "login-service")]
#[command(about = "JSON login and registration endpoints backed by configured accounts")]
struct Args {
    /// Path to a TOML config file. Built-in defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Reload credential accounts when the config file changes.
    #[arg(long, requires = "config")]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability)?;

    tracing::info!("login-service v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        accounts = config.credentials.accounts.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The watcher handle must outlive the server.
    let (_watcher, config_updates) = match (&args.config, args.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::watch(path)?;
            (Some(watcher), updates)
        }
        _ => (None, mpsc::unbounded_channel().1),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = ApiServer::new(config);
    shutdown.trigger_on_signal();

    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
