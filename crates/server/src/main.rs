//! mcp-fetchserp server entry point.
//!
//! Boots the MCP server on stdio (default) or streamable HTTP.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use fetchserp_client::{FetchSerpClient, FetchSerpConfig, Upstream};
use fetchserp_core::{AppConfig, ResultCache, Transport};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod http;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = Arc::new(AppConfig::load()?);

    if let Err(e) = config.require_api_token() {
        tracing::warn!("{}; search and fetch will fail until it is set", e);
    }

    let cache = Arc::new(ResultCache::new(config.cache_ttl(), config.cache_sweep_interval()));
    let upstream: Arc<dyn Upstream> = Arc::new(FetchSerpClient::new(FetchSerpConfig::from(config.as_ref()))?);
    let handler = handler::McpFetchSerpServer::new(config.clone(), cache, upstream);

    match config.transport {
        Transport::Stdio => {
            tracing::info!("Starting mcp-fetchserp server on stdio transport");
            let server = serve_server(handler, stdio()).await?;
            server.waiting().await?;
        }
        Transport::Http => http::serve(handler, &config.bind_addr()).await?,
    }

    Ok(())
}
