//! HTTP API serving host metrics.

pub mod config;
pub mod handlers;
pub mod router;

// Re-export commonly used items
pub use config::WebConfig;
pub use router::create_app;

use crate::error::{Result, SystemError};
use crate::metrics::SystemCollector;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Serve the API until Ctrl+C, then release the collector's resources.
pub async fn start_web_server(config: WebConfig, collector: Arc<SystemCollector>) -> Result<()> {
    let app = create_app(&config, collector.clone());

    let addr = config
        .bind_address()
        .parse::<SocketAddr>()
        .map_err(|e| SystemError::config_error(format!("Invalid bind address: {}", e)))?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SystemError::web_server_error(format!("Failed to bind to address: {}", e)))?;

    info!("Serving host metrics on http://{}", addr);
    info!("Snapshot endpoint: http://{}/api/sys", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| SystemError::web_server_error(format!("Server error: {}", e)));

    collector.shutdown();
    info!("Server stopped");
    served
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
