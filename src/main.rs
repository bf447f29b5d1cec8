//! Funds Ledger server
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌────────────────┐    ┌────────────┐
//! │  Config  │───▶│ Gateway  │───▶│ TransferEngine │───▶│ PostgreSQL │
//! │  (YAML)  │    │  (axum)  │    │ (row locks)    │    │            │
//! └──────────┘    └────┬─────┘    └────────────────┘    └────────────┘
//!                      │
//!                 ┌────▼─────┐    ┌──────────┐
//!                 │ Sessions │◀───│ Sweeper  │
//!                 └──────────┘    └──────────┘
//! ```
//!
//! Shutdown on Ctrl-C: stop accepting and drain requests, stop the sweeper
//! and wait for it, then close the pool.

use std::sync::Arc;

use anyhow::Context;

use funds_ledger::config::AppConfig;
use funds_ledger::db::Database;
use funds_ledger::gateway::{self, AppState};
use funds_ledger::logging::init_logging;
use funds_ledger::session::{SessionStore, SessionSweeper, SweepConfig};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        // Without a signal handler the server runs until killed
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }

    let _log_guard = init_logging(&app_config);
    tracing::info!(
        env = %env,
        version = env!("CARGO_PKG_VERSION"),
        git = env!("LEDGER_GIT_HASH"),
        "Starting funds ledger"
    );

    let db = Database::connect(&app_config.postgres_url, app_config.max_connections)
        .await
        .context("Failed to connect to PostgreSQL")?;

    let sessions = Arc::new(SessionStore::new(app_config.session.ttl()));
    let sweeper = SessionSweeper::spawn(
        sessions.clone(),
        SweepConfig::from(&app_config.session),
    );

    let state = Arc::new(AppState::new(
        db.clone(),
        sessions,
        app_config.transfer.timeout(),
    ));

    let served = gateway::run_server(&app_config.gateway, state, shutdown_signal()).await;

    sweeper.shutdown().await;
    db.close().await;

    served.context("Gateway server error")?;
    tracing::info!("Shutdown complete");
    Ok(())
}
