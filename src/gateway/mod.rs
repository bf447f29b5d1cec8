pub mod handlers;
pub mod state;
pub mod types;

use std::future::Future;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;

use crate::config::GatewayConfig;
pub use state::AppState;

pub use types::{ApiError, ApiResponse, ApiResult, error_codes};

/// Build the HTTP router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::welcome))
        .route("/health", get(handlers::health_check))
        .route("/login", post(handlers::login))
        .route("/transfers", post(handlers::create_transfer))
        .with_state(state)
}

/// Serve until `shutdown` resolves, then drain in-flight requests
pub async fn run_server<F>(
    config: &GatewayConfig,
    state: Arc<AppState>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await.inspect_err(|e| {
        tracing::error!(%addr, error = %e, "Failed to bind gateway listener");
    })?;

    tracing::info!(%addr, "Gateway listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
