use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::errors::Error;
use crate::ControlPlane;

use super::routes::build_router;

/// Bind and run the REST API server until ctrl-c.
pub async fn start_api_server(
    config: &ServerConfig,
    control: Arc<ControlPlane>,
) -> crate::Result<()> {
    let router = build_router(control);

    let listener = TcpListener::bind(config.socket_addr())
        .await
        .map_err(|e| Error::transport(format!("failed to bind API server: {}", e)))?;

    let addr = listener
        .local_addr()
        .map_err(|e| Error::transport(format!("failed to read bound address: {}", e)))?;
    info!(address = %addr, "starting HTTP API server");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "API server shutdown listener failed");
            }
        })
        .await
        .map_err(|e| Error::transport(format!("API server error: {}", e)))?;

    info!("API server shutdown completed");
    Ok(())
}
