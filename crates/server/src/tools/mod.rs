//! MCP tool implementations.
//!
//! This module contains all tools exposed by the mcp-fetchserp server.

pub mod fetch;
pub mod health;
pub mod search;

pub use fetch::{FetchParams, fetch_impl};
pub use health::{HealthStatus, health_impl};
pub use search::{SearchParams, search_impl};

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

/// Wrap a tool payload in the single text content block every tool returns.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(output).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}


#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;
    use fetchserp_client::fetchserp::{SCRAPE_PATH, SERP_PATH};
    use fetchserp_client::{FetchSerpError, Method, Upstream};
    use fetchserp_core::{ManualClock, ResultCache};
    use rmcp::model::CallToolResult;
    use serde_json::Value;

    /// Upstream stand-in serving a fixed SERP body and synthetic page content.
    pub struct StubUpstream {
        serp: Result<Value, FetchSerpError>,
        failing_urls: Vec<String>,
        pub calls: Mutex<Vec<(String, Value)>>,
    }

    impl StubUpstream {
        /// SERP response with `n` ranked results on example.com.
        pub fn with_results(n: usize) -> Self {
            let results: Vec<Value> = (1..=n)
                .map(|i| {
                    serde_json::json!({
                        "url": format!("https://example.com/{i}"),
                        "title": format!("Result {i}"),
                        "description": format!("Snippet {i}"),
                        "ranking": i,
                    })
                })
                .collect();
            Self::with_serp(Ok(serde_json::json!({ "data": { "results": results } })))
        }

        pub fn with_serp(serp: Result<Value, FetchSerpError>) -> Self {
            Self { serp, failing_urls: Vec::new(), calls: Mutex::new(Vec::new()) }
        }

        /// Make content retrieval fail for `url`.
        pub fn fail_scrape_for(mut self, url: &str) -> Self {
            self.failing_urls.push(url.to_string());
            self
        }

        pub fn calls_to(&self, path: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|(p, _)| p == path).count()
        }
    }

    #[async_trait]
    impl Upstream for StubUpstream {
        async fn call(&self, path: &str, _method: Method, params: &Value) -> Result<Value, FetchSerpError> {
            self.calls.lock().unwrap().push((path.to_string(), params.clone()));

            match path {
                SERP_PATH => self.serp.clone(),
                SCRAPE_PATH => {
                    let url = params["url"].as_str().unwrap_or_default();
                    if self.failing_urls.iter().any(|u| u == url) {
                        Err(FetchSerpError::Status { status: 503, body: "scrape failed".into() })
                    } else {
                        Ok(serde_json::json!({ "data": { "url": url, "html": format!("<p>content of {url}</p>") } }))
                    }
                }
                other => Err(FetchSerpError::Status { status: 404, body: format!("no route {other}") }),
            }
        }
    }

    pub fn test_cache() -> (Arc<ResultCache>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = ResultCache::with_clock(chrono::Duration::minutes(30), chrono::Duration::minutes(1), clock.clone());
        (Arc::new(cache), clock)
    }

    /// Decode the JSON payload of a tool result's text block.
    pub fn output_json(result: &CallToolResult) -> Value {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }
}
