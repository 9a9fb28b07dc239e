//! Streamable HTTP transport.
//!
//! Mounts the MCP service at `/mcp` next to a plain `GET /health` probe.

use anyhow::Result;
use axum::{Json, Router, extract::State, routing::get};
use rmcp::transport::{
    StreamableHttpServerConfig, StreamableHttpService, streamable_http_server::session::local::LocalSessionManager,
};

use crate::handler::McpFetchSerpServer;
use crate::tools::HealthStatus;

/// Build the axum router for the HTTP transport.
pub fn router(handler: McpFetchSerpServer) -> Router {
    let mcp_handler = handler.clone();
    let service = StreamableHttpService::new(
        move || Ok(mcp_handler.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .route("/health", get(health))
        .nest_service("/mcp", service)
        .with_state(handler)
}

async fn health(State(server): State<McpFetchSerpServer>) -> Json<HealthStatus> {
    Json(server.health_status())
}

/// Serve until Ctrl-C.
pub async fn serve(handler: McpFetchSerpServer, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Starting mcp-fetchserp server on streamable HTTP transport at /mcp");

    axum::serve(listener, router(handler))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}
