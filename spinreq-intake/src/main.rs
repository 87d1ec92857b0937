//! Request Intake (spinreq-intake) - Main entry point
//!
//! Evaluates crowd-sourced song requests against each organization's rule
//! set and serves the REST API for intake and rule administration.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spinreq_intake::api::{self, AppState};

/// Command-line arguments for spinreq-intake
#[derive(Parser, Debug)]
#[command(name = "spinreq-intake")]
#[command(about = "Request intake microservice for SpinReq")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5850", env = "SPINREQ_INTAKE_PORT")]
    port: u16,

    /// Data folder containing the SQLite database
    #[arg(short, long, env = "SPINREQ_DATA_FOLDER")]
    data_folder: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spinreq_intake=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command-line arguments
    let args = Args::parse();

    info!("Starting SpinReq Intake on port {}", args.port);

    let data_folder =
        spinreq_common::config::resolve_data_folder(args.data_folder.as_deref(), "SPINREQ_DATA_FOLDER")
            .context("Failed to resolve data folder")?;
    info!("Data folder: {}", data_folder.display());

    let db_path = data_folder.join("spinreq.db");
    let db = spinreq_common::db::init::init_database(&db_path)
        .await
        .context("Failed to initialize database")?;
    info!("Database initialized");

    // Build the application router
    let app = api::create_router(AppState::new(db, args.port));

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
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
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
