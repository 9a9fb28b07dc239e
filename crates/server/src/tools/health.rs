//! health_check tool implementation.

use fetchserp_core::{AppConfig, ResultCache};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Server liveness report.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HealthStatus {
    pub status: String,
    pub server: String,
    pub version: String,
    /// "FetchSERP API" when a token is configured, otherwise "No API token".
    pub api_connected: String,
    /// Entries currently held, including expired ones awaiting a sweep.
    pub cache_entries: usize,
    pub cache_ttl_secs: u64,
}

impl HealthStatus {
    pub fn collect(cache: &ResultCache, config: &AppConfig) -> Self {
        let api_connected = if config.require_api_token().is_ok() { "FetchSERP API" } else { "No API token" };

        Self {
            status: "healthy".into(),
            server: "mcp-fetchserp".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            api_connected: api_connected.into(),
            cache_entries: cache.len(),
            cache_ttl_secs: cache.ttl().num_seconds().max(0) as u64,
        }
    }
}

/// Implementation of the health_check tool.
pub async fn health_impl(cache: &ResultCache, config: &AppConfig) -> Result<CallToolResult, McpError> {
    json_result(&HealthStatus::collect(cache, config))
}
