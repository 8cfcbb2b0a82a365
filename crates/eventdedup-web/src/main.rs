//! Web server for the event deduplication dashboard
#![forbid(unsafe_code)]

use eventdedup_core::{Config, init_logging};
use eventdedup_web::{AppState, build_app};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Get configuration; logging is not up yet, so report a bad config after init
    let (config, load_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    init_logging(&config.logging)?;
    if let Some(e) = load_error {
        warn!("Failed to load config: {}, using defaults", e);
    }

    let state = Arc::new(AppState::new(config.clone())?);
    let tasks = state.start_refresh()?;

    // Use configuration for web server address
    let host: IpAddr = config
        .webserver
        .host
        .parse()
        .map_err(|e| format!("Invalid web server host '{}': {}", config.webserver.host, e))?;
    let addr = SocketAddr::new(host, config.webserver.port);

    info!(
        %addr,
        api_base_url = %config.dashboard.api_base_url,
        refresh_interval_ms = config.dashboard.refresh_interval_ms,
        "Starting dashboard web server"
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, build_app(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    for task in tasks {
        task.shutdown().await;
    }
    info!("Dashboard web server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
