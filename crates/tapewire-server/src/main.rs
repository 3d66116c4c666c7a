//! Tapewire server binary.
//!
//! # Usage
//!
//! ```bash
//! # Listen on the default port, loopback only
//! tapewire-server
//!
//! # Listen on all interfaces with a smaller session limit
//! tapewire-server --bind 0.0.0.0:12345 --max-sessions 16
//! ```
//!
//! Runs until Ctrl-C, then notifies every client with `SERVER_SHUTDOWN`.

use std::time::Duration;

use clap::Parser;
use tapewire_server::{DEFAULT_PORT, Server, ServerConfig, ServerEvent};
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Tapewire relay server
#[derive(Parser, Debug)]
#[command(name = "tapewire-server")]
#[command(about = "Tapewire shared-slot relay server")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value_t = format!("127.0.0.1:{DEFAULT_PORT}"))]
    bind: String,

    /// Maximum concurrent sessions
    #[arg(long, default_value = "64")]
    max_sessions: usize,

    /// Seconds a new connection has to send its handshake
    #[arg(long, default_value = "10")]
    handshake_timeout_secs: u64,

    /// Seconds sessions get to close on shutdown before being aborted
    #[arg(long, default_value = "2")]
    shutdown_grace_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("Tapewire server starting");
    tracing::info!("Binding to {}", args.bind);

    let config = ServerConfig {
        bind_address: args.bind,
        max_sessions: args.max_sessions,
        handshake_timeout: Duration::from_secs(args.handshake_timeout_secs),
        shutdown_grace: Duration::from_secs(args.shutdown_grace_secs),
        ..Default::default()
    };

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let server = Server::start(config, events_tx).await?;

    tracing::info!("Server listening on {}", server.local_addr());

    let event_log = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            match event {
                ServerEvent::ClientConnected { client_id, address } => {
                    tracing::info!(%client_id, %address, "joined");
                },
                ServerEvent::ClientDisconnected { client_id } => {
                    tracing::info!(%client_id, "left");
                },
                ServerEvent::MessageStored { client_id, payload } => {
                    tracing::info!(%client_id, %payload, "stored");
                },
                ServerEvent::StateChanged(state) => {
                    tracing::debug!(?state, "state");
                },
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Ctrl-C received, stopping");

    server.stop().await;
    drop(server);
    event_log.await?;

    Ok(())
}
