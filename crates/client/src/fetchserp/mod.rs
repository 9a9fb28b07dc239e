//! FetchSERP API client.
//!
//! Provides an authenticated client for the FetchSERP REST API together with
//! typed helpers for the two endpoints the search/fetch workflow relies on.
//!
//! ### Contract
//!
//! - **Base URL**: `https://api.fetchserp.com/api/v1`
//! - **Authentication**: `Authorization: Bearer <token>`.
//! - **Calls**: `call(path, method, params)`. GET sends `params` as the query
//!   string, other methods send them as a JSON body.
//! - **Errors**: 401/403 → `AuthError`, 429 → `RateLimited`, any other non-2xx
//!   → `Status { status, body }`. Every request carries the client timeout.
//!
//! The [`Upstream`] trait is the seam tools depend on, so they can be driven by
//! a stub in tests.

pub mod error;
pub mod request;
pub mod response;

pub use error::FetchSerpError;
pub use request::{SearchEngine, SerpRequest};
pub use response::{ScrapedPage, SerpResponse, SerpResult};
pub use reqwest::Method;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use fetchserp_core::AppConfig;
use reqwest::header;
use serde_json::Value;

/// Default base URL for the FetchSERP API.
pub const DEFAULT_BASE_URL: &str = "https://api.fetchserp.com/api/v1";

/// SERP endpoint path.
pub const SERP_PATH: &str = "serp";

/// Page scrape endpoint path.
pub const SCRAPE_PATH: &str = "scrape";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "mcp-fetchserp/0.1";

/// Longest error body kept in `FetchSerpError::Status`.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// FetchSERP client configuration.
#[derive(Debug, Clone)]
pub struct FetchSerpConfig {
    /// Bearer token. Calls fail with `MissingApiToken` while unset.
    pub api_token: Option<String>,
    /// Base URL (default: https://api.fetchserp.com/api/v1).
    pub base_url: String,
    /// Request timeout (default: 30s).
    pub timeout: Duration,
    /// User-agent string (default: mcp-fetchserp/0.1).
    pub user_agent: String,
}

impl Default for FetchSerpConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl From<&AppConfig> for FetchSerpConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            api_token: config.api_token.clone(),
            base_url: config.base_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Authenticated access to the upstream REST API.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Issue one request and return the decoded JSON body.
    async fn call(&self, path: &str, method: Method, params: &Value) -> Result<Value, FetchSerpError>;
}

/// FetchSERP API client.
#[derive(Debug, Clone)]
pub struct FetchSerpClient {
    http: reqwest::Client,
    config: Arc<FetchSerpConfig>,
}

impl FetchSerpClient {
    /// Create a new client with the given configuration.
    pub fn new(config: FetchSerpConfig) -> Result<Self, FetchSerpError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| FetchSerpError::Network(Arc::new(e)))?;

        Ok(Self { http, config: Arc::new(config) })
    }

    /// Whether a non-blank token is configured.
    pub fn has_token(&self) -> bool {
        self.token().is_some()
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchSerpConfig {
        &self.config
    }

    fn token(&self) -> Option<&str> {
        self.config.api_token.as_deref().filter(|t| !t.trim().is_empty())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Upstream for FetchSerpClient {
    async fn call(&self, path: &str, method: Method, params: &Value) -> Result<Value, FetchSerpError> {
        let token = self.token().ok_or(FetchSerpError::MissingApiToken)?;
        let url = self.endpoint(path);
        let start = Instant::now();

        tracing::debug!(%method, %url, "calling FetchSERP");

        let mut request = self
            .http
            .request(method.clone(), &url)
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json");

        request = match (method == Method::GET, params) {
            (_, Value::Null) => request,
            (true, params) => request.query(params),
            (false, params) => request.json(params),
        };

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(%url, %status, elapsed_ms = start.elapsed().as_millis() as u64, "FetchSERP response");

        if status == 401 || status == 403 {
            return Err(FetchSerpError::AuthError { status: status.as_u16() });
        }

        if status == 429 {
            return Err(FetchSerpError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchSerpError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| FetchSerpError::Parse(e.to_string()))
    }
}

/// Run a SERP query and normalize the ranked results.
pub async fn search_serp(upstream: &dyn Upstream, req: &SerpRequest) -> Result<SerpResponse, FetchSerpError> {
    req.validate()?;

    let value = upstream.call(SERP_PATH, Method::GET, &req.to_params()).await?;
    let response = SerpResponse::from_json(value)?;

    tracing::debug!(query = %req.query, results = response.result_count(), "SERP query completed");

    Ok(response)
}

/// Retrieve the content of a single page.
pub async fn scrape_page(upstream: &dyn Upstream, url: &str) -> Result<ScrapedPage, FetchSerpError> {
    let value = upstream.call(SCRAPE_PATH, Method::GET, &serde_json::json!({ "url": url })).await?;
    Ok(ScrapedPage::from_json(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accept one connection, capture the request head, and answer with `status_line`.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let mut request = Vec::new();
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;

            String::from_utf8_lossy(&request).to_string()
        });

        (format!("http://{addr}"), handle)
    }

    fn client_for(base_url: String) -> FetchSerpClient {
        FetchSerpClient::new(FetchSerpConfig {
            api_token: Some("test-token".into()),
            base_url,
            timeout: Duration::from_secs(5),
            ..Default::default()
        })
        .unwrap()
    }

    #[derive(Default)]
    struct RecordingUpstream {
        calls: Mutex<Vec<(String, Value)>>,
        response: Value,
    }

    #[async_trait]
    impl Upstream for RecordingUpstream {
        async fn call(&self, path: &str, _method: Method, params: &Value) -> Result<Value, FetchSerpError> {
            self.calls.lock().unwrap().push((path.to_string(), params.clone()));
            Ok(self.response.clone())
        }
    }

    #[test]
    fn test_config_default() {
        let config = FetchSerpConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.user_agent, "mcp-fetchserp/0.1");
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_config_from_app_config() {
        let app = AppConfig { api_token: Some("abc".into()), timeout_ms: 1_500, ..Default::default() };
        let config = FetchSerpConfig::from(&app);
        assert_eq!(config.api_token.as_deref(), Some("abc"));
        assert_eq!(config.timeout, Duration::from_millis(1_500));
        assert_eq!(config.base_url, app.base_url);
    }

    #[test]
    fn test_endpoint_joining() {
        let client = client_for("https://api.fetchserp.com/api/v1/".into());
        assert_eq!(client.endpoint("/serp"), "https://api.fetchserp.com/api/v1/serp");
        assert_eq!(client.endpoint("scrape"), "https://api.fetchserp.com/api/v1/scrape");
    }

    #[tokio::test]
    async fn test_missing_token() {
        let client = FetchSerpClient::new(FetchSerpConfig::default()).unwrap();
        assert!(!client.has_token());

        let result = client.call(SERP_PATH, Method::GET, &Value::Null).await;
        assert!(matches!(result, Err(FetchSerpError::MissingApiToken)));
    }

    #[tokio::test]
    async fn test_call_sends_bearer_and_query() {
        let (base_url, server) = serve_once("200 OK", r#"{"data":{"results":[]}}"#).await;
        let client = client_for(base_url);

        let value = client
            .call(SERP_PATH, Method::GET, &serde_json::json!({ "query": "seo" }))
            .await
            .unwrap();
        assert_eq!(value["data"]["results"], serde_json::json!([]));

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /serp?query=seo "), "unexpected request: {request}");
        assert!(request.to_lowercase().contains("authorization: bearer test-token"));
    }

    #[tokio::test]
    async fn test_call_server_error() {
        let (base_url, _server) = serve_once("502 Bad Gateway", r#"{"error":"upstream down"}"#).await;
        let result = client_for(base_url).call(SERP_PATH, Method::GET, &Value::Null).await;

        match result {
            Err(FetchSerpError::Status { status, body }) => {
                assert_eq!(status, 502);
                assert!(body.contains("upstream down"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_call_auth_and_rate_limit() {
        let (base_url, _server) = serve_once("401 Unauthorized", "{}").await;
        let result = client_for(base_url).call(SERP_PATH, Method::GET, &Value::Null).await;
        assert!(matches!(result, Err(FetchSerpError::AuthError { status: 401 })));

        let (base_url, _server) = serve_once("429 Too Many Requests", "{}").await;
        let result = client_for(base_url).call(SERP_PATH, Method::GET, &Value::Null).await;
        assert!(matches!(result, Err(FetchSerpError::RateLimited)));
    }

    #[tokio::test]
    async fn test_call_invalid_json() {
        let (base_url, _server) = serve_once("200 OK", "not json").await;
        let result = client_for(base_url).call(SERP_PATH, Method::GET, &Value::Null).await;
        assert!(matches!(result, Err(FetchSerpError::Parse(_))));
    }

    #[tokio::test]
    async fn test_call_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let client = FetchSerpClient::new(FetchSerpConfig {
            api_token: Some("test-token".into()),
            base_url: format!("http://{addr}"),
            timeout: Duration::from_millis(200),
            ..Default::default()
        })
        .unwrap();

        let result = client.call(SERP_PATH, Method::GET, &Value::Null).await;
        assert!(matches!(result, Err(FetchSerpError::Timeout)), "got {result:?}");
    }

    #[tokio::test]
    async fn test_search_serp_validates_before_calling() {
        let upstream = RecordingUpstream::default();
        let req = SerpRequest { query: "".into(), ..Default::default() };

        let result = search_serp(&upstream, &req).await;
        assert!(matches!(result, Err(FetchSerpError::InvalidRequest(_))));
        assert!(upstream.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_serp_and_scrape_paths() {
        let upstream = RecordingUpstream {
            response: serde_json::json!({
                "data": {
                    "html": "<p>body</p>",
                    "results": [{ "url": "https://example.com", "title": "Example", "ranking": 1 }]
                }
            }),
            ..Default::default()
        };

        let req = SerpRequest { query: "seo".into(), ..Default::default() };
        let serp = search_serp(&upstream, &req).await.unwrap();
        assert_eq!(serp.result_count(), 1);

        let page = scrape_page(&upstream, "https://example.com").await.unwrap();
        assert_eq!(page.content, "<p>body</p>");

        let calls = upstream.calls.lock().unwrap();
        assert_eq!(calls[0].0, SERP_PATH);
        assert_eq!(calls[0].1["query"], "seo");
        assert_eq!(calls[1].0, SCRAPE_PATH);
        assert_eq!(calls[1].1["url"], "https://example.com");
    }
}
