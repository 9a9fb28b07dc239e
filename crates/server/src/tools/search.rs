//! search tool implementation.
//!
//! Runs a FetchSERP query, keeps the top-K results, and indexes each one in the
//! result cache so later `fetch` calls can refer to it by id.

use fetchserp_client::{SearchEngine, SerpRequest, Upstream, search_serp};
use fetchserp_core::{AppConfig, Error, ResultCache};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Input parameters for the search tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// Search query (required).
    pub query: String,

    /// Number of leading results to keep (default 10, capped at the server maximum).
    #[serde(default)]
    pub top_k: Option<usize>,

    /// Search engine: google (default), bing, yahoo, duckduckgo.
    #[serde(default)]
    pub search_engine: Option<String>,

    /// Country code (ISO 3166-1 alpha-2, default "us").
    #[serde(default)]
    pub country: Option<String>,

    /// Result pages to collect upstream (1-30, default 1).
    #[serde(default)]
    pub pages_number: Option<u8>,
}

/// A search result handed back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchItem {
    /// Opaque id accepted by the fetch tool.
    pub id: String,
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// Rank in the upstream result set.
    pub position: u32,
}

/// Output structure for the search tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchOutput {
    pub items: Vec<SearchItem>,
}

fn resolve_top_k(requested: Option<usize>, config: &AppConfig) -> Result<usize, Error> {
    match requested {
        Some(0) => Err(Error::InvalidInput("top_k must be at least 1".into())),
        Some(k) if k > config.max_top_k => {
            tracing::debug!(requested = k, max = config.max_top_k, "clamping top_k");
            Ok(config.max_top_k)
        }
        Some(k) => Ok(k),
        None => Ok(config.default_top_k),
    }
}

/// Implementation of the search tool.
pub async fn search_impl(
    cache: &ResultCache, upstream: &dyn Upstream, config: &AppConfig, params: SearchParams,
) -> Result<CallToolResult, McpError> {
    let query = params.query.trim();
    if query.is_empty() {
        return Err(Error::InvalidInput("query cannot be empty".into()).into());
    }

    let top_k = resolve_top_k(params.top_k, config)?;

    let search_engine = params
        .search_engine
        .as_deref()
        .map(str::parse::<SearchEngine>)
        .transpose()
        .map_err(Error::from)?;

    let req = SerpRequest {
        query: query.to_string(),
        search_engine,
        country: params.country,
        pages_number: params.pages_number,
    };

    let response = search_serp(upstream, &req).await.map_err(Error::from)?;

    let items: Vec<SearchItem> = response
        .results
        .into_iter()
        .take(top_k)
        .map(|r| {
            let id = cache.put(&r.url, r.position, query, r.title.as_deref(), r.snippet.as_deref());
            SearchItem {
                id,
                title: r.title.unwrap_or_else(|| r.url.clone()),
                snippet: r.snippet.unwrap_or_default(),
                url: r.url,
                position: r.position,
            }
        })
        .collect();

    tracing::debug!(query, top_k, indexed = items.len(), cache_entries = cache.len(), "indexed search results");

    json_result(&SearchOutput { items })
}
