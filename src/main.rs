//! recipient-draw server entry point.
//!
//! Opens the configured pool store and starts the Axum HTTP server.

use std::time::Duration;

use tracing_subscriber::EnvFilter;

use recipient_draw::api;
use recipient_draw::app_state::AppState;
use recipient_draw::config::{DrawConfig, LogFormat};
use recipient_draw::persistence;
use recipient_draw::service::DrawService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = DrawConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, backend = ?config.store_backend, "starting recipient-draw");

    // Build persistence layer
    let store = persistence::open(&config).await?;
    match store.read().await {
        Ok(stored) => tracing::info!(
            store = store.describe(),
            unassigned = stored.state.unassigned().len(),
            assigned = stored.state.assigned().len(),
            "pool loaded"
        ),
        Err(e) => tracing::warn!(store = store.describe(), error = %e, "pool state not readable yet"),
    }

    // Build service layer
    let draw_service = DrawService::new(store, config.draw_seed, config.allocation_max_retries);
    let app_state = AppState::new(draw_service);

    // Build router
    let app = api::build_app(
        app_state,
        Duration::from_secs(config.request_timeout_secs),
    );

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
