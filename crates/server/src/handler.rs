//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::{FetchParams, HealthStatus, SearchParams, fetch_impl, health_impl, search_impl};
use fetchserp_client::Upstream;
use fetchserp_core::{AppConfig, ResultCache};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

const INSTRUCTIONS: &str = "Use `search` to find SEO and web results for a query; it returns short ids. \
Pass those ids to `fetch` to retrieve page content. Ids expire after the cache TTL.";

/// The main MCP server handler for mcp-fetchserp.
///
/// Cheap to clone: the cache, upstream client, and config are shared.
#[derive(Clone)]
pub struct McpFetchSerpServer {
    tool_router: ToolRouter<Self>,
    cache: Arc<ResultCache>,
    upstream: Arc<dyn Upstream>,
    config: Arc<AppConfig>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl McpFetchSerpServer {
    /// Create a new server handler around a shared cache and upstream.
    pub fn new(config: Arc<AppConfig>, cache: Arc<ResultCache>, upstream: Arc<dyn Upstream>) -> Self {
        Self { tool_router: Self::tool_router(), cache, upstream, config }
    }

    /// Search the web through FetchSERP.
    ///
    /// Results are indexed in the result cache and returned with short ids.
    #[tool(
        description = "Search the web for SEO and ranking research. Returns {items: [{id, title, url, snippet, position}]}; pass ids to fetch."
    )]
    async fn search(&self, params: Parameters<SearchParams>) -> Result<CallToolResult, McpError> {
        search_impl(&self.cache, self.upstream.as_ref(), &self.config, params.0).await
    }

    /// Retrieve page content for ids returned by search.
    #[tool(
        description = "Fetch page content for ids returned by search. Returns {docs: [...], missing: [...]}; unknown or expired ids are listed in missing."
    )]
    async fn fetch(&self, params: Parameters<FetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.cache, self.upstream.clone(), &self.config, params.0).await
    }

    /// Report server status.
    #[tool(description = "Server health check.")]
    async fn health_check(&self) -> Result<CallToolResult, McpError> {
        health_impl(&self.cache, &self.config).await
    }

    /// Current health snapshot, shared with the HTTP `/health` route.
    pub fn health_status(&self) -> HealthStatus {
        HealthStatus::collect(&self.cache, &self.config)
    }
}

impl ServerHandler for McpFetchSerpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "mcp-fetchserp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(INSTRUCTIONS.into()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
