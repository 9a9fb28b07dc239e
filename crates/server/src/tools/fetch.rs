//! fetch tool implementation.
//!
//! Resolves ids from a previous search and retrieves page content for each one.
//! Every id is handled on its own: unknown or expired ids land in `missing`, and
//! a failed retrieval still yields a document with empty content. Only invalid
//! arguments fail the whole call.

use std::sync::Arc;

use fetchserp_client::{Upstream, scrape_page};
use fetchserp_core::{AppConfig, CacheEntry, Error, ResultCache};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::json_result;

/// Input parameters for the fetch tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FetchParams {
    /// Ids returned by the search tool.
    pub ids: Vec<String>,
}

/// Where a document came from.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DocMetadata {
    /// Query that produced the id.
    pub query: String,
    pub position: u32,
    /// RFC 3339 time the id was issued.
    pub indexed_at: String,
    /// Why `content` is empty, if retrieval failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A fetched document.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchedDoc {
    pub id: String,
    pub title: String,
    pub url: String,
    pub content: String,
    pub metadata: DocMetadata,
}

/// Output structure for the fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchOutput {
    /// Documents for every id found in the cache, in request order.
    pub docs: Vec<FetchedDoc>,
    /// Ids that were unknown or expired.
    pub missing: Vec<String>,
}

fn build_doc(entry: CacheEntry, retrieved: Result<fetchserp_client::ScrapedPage, String>) -> FetchedDoc {
    let (content, page_title, error) = match retrieved {
        Ok(page) => (page.content, page.title, None),
        Err(e) => (String::new(), None, Some(e)),
    };

    FetchedDoc {
        title: entry.title.or(page_title).unwrap_or_else(|| entry.url.clone()),
        metadata: DocMetadata {
            query: entry.query,
            position: entry.position,
            indexed_at: entry.inserted_at.to_rfc3339(),
            error,
        },
        id: entry.id,
        url: entry.url,
        content,
    }
}

/// Implementation of the fetch tool.
pub async fn fetch_impl(
    cache: &ResultCache, upstream: Arc<dyn Upstream>, config: &AppConfig, params: FetchParams,
) -> Result<CallToolResult, McpError> {
    if params.ids.is_empty() {
        return Err(Error::InvalidInput("ids cannot be empty".into()).into());
    }
    if params.ids.len() > config.max_fetch_ids {
        return Err(Error::InvalidInput(format!(
            "too many ids: {} (max {})",
            params.ids.len(),
            config.max_fetch_ids
        ))
        .into());
    }

    let mut missing = Vec::new();
    let mut hits = Vec::new();
    for (idx, id) in params.ids.into_iter().enumerate() {
        match cache.get(&id) {
            Some(entry) => hits.push((idx, entry)),
            None => missing.push(id),
        }
    }

    let semaphore = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
    let mut join_set = JoinSet::new();

    for (idx, entry) in hits {
        let semaphore = semaphore.clone();
        let upstream = upstream.clone();

        join_set.spawn(async move {
            // Held for the whole retrieval.
            let _permit = semaphore.acquire_owned().await;
            let retrieved = scrape_page(upstream.as_ref(), &entry.url).await.map_err(|e| {
                tracing::warn!(id = %entry.id, url = %entry.url, error = %e, "content retrieval failed");
                e.to_string()
            });
            (idx, build_doc(entry, retrieved))
        });
    }

    let mut docs = Vec::with_capacity(join_set.len());
    while let Some(result) = join_set.join_next().await {
        docs.push(result.map_err(|e| McpError::internal_error(e.to_string(), None))?);
    }
    docs.sort_by_key(|(idx, _)| *idx);

    let output = FetchOutput { docs: docs.into_iter().map(|(_, doc)| doc).collect(), missing };

    tracing::debug!(docs = output.docs.len(), missing = output.missing.len(), "fetch completed");

    json_result(&output)
}
