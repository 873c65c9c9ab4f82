//! Mock VRUC OAuth 2.0 server
//!
//! Stands in for the VRUC identity provider during client integration tests.
//! All codes and tokens live in memory and vanish on restart.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vruc_mock::clock::SystemClock;
use vruc_mock::config::Config;
use vruc_mock::user::FakeUser;
use vruc_mock::AppState;

#[derive(Parser, Debug)]
#[command(name = "vruc-mock")]
#[command(about = "Mock VRUC OAuth 2.0 authorization server")]
struct Cli {
    /// Port to listen on
    #[arg(long, default_value_t = 8000, env = "VRUC_PORT")]
    port: u16,

    /// Address to bind to
    #[arg(long, default_value = "0.0.0.0", env = "VRUC_BIND")]
    bind: String,

    /// Public URL for this service (used in OAuth metadata)
    #[arg(long, default_value = "http://localhost:8000", env = "VRUC_PUBLIC_URL")]
    public_url: String,

    /// Optional JSON config file
    #[arg(long, env = "VRUC_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vruc_mock=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    tracing::info!("Accepting client {}", config.client_id);

    let state = Arc::new(AppState::new(
        config,
        FakeUser::default(),
        Arc::new(SystemClock),
        cli.public_url.clone(),
    ));
    let app = vruc_mock::router(state);

    // Parse bind address
    let addr: SocketAddr = format!("{}:{}", cli.bind, cli.port).parse()?;

    tracing::info!("Starting vruc-mock on {}", addr);
    tracing::info!("Public URL: {}", cli.public_url);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("vruc-mock shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
