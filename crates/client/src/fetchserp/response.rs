//! FetchSERP response types and normalization.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::FetchSerpError;

/// Raw response from `GET /serp`.
///
/// Results usually sit under `data.results`; some endpoints return them at the
/// top level, so both are accepted. Items stay as raw JSON until
/// normalization so one odd entry cannot fail the whole response.
#[derive(Debug, Default, Deserialize)]
pub struct SerpApiResponse {
    #[serde(default)]
    pub data: Option<SerpData>,
    #[serde(default)]
    pub results: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SerpData {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub results_count: Option<u64>,
    #[serde(default)]
    pub results: Vec<Value>,
}

/// Individual result as returned by FetchSERP.
#[derive(Debug, Default)]
pub struct SerpApiResult {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub ranking: Option<u32>,
    pub site_name: Option<String>,
}

impl SerpApiResult {
    /// Read one result item, preferring `description` over `snippet` and
    /// `ranking` over `position`. Returns `None` for non-object entries.
    pub fn from_value(value: &Value) -> Option<Self> {
        let item = value.as_object()?;
        let text = |key: &str| item.get(key).and_then(Value::as_str).map(str::to_string);
        let rank = |key: &str| {
            item.get(key).and_then(|v| match v {
                Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
        };

        Some(SerpApiResult {
            url: text("url"),
            title: text("title"),
            description: text("description").or_else(|| text("snippet")),
            ranking: rank("ranking").or_else(|| rank("position")),
            site_name: text("site_name"),
        })
    }
}

/// Normalized SERP response.
#[derive(Debug, Clone, Serialize)]
pub struct SerpResponse {
    pub query: Option<String>,
    pub results_count: Option<u64>,
    pub results: Vec<SerpResult>,
}

/// Normalized SERP result.
#[derive(Debug, Clone, Serialize)]
pub struct SerpResult {
    pub url: String,
    pub title: Option<String>,
    pub snippet: Option<String>,
    /// Upstream ranking, or 1-indexed order when the upstream omits it.
    pub position: u32,
}

impl From<SerpApiResponse> for SerpResponse {
    /// Convert a raw SERP response to the normalized form.
    ///
    /// Results without a URL cannot be fetched later and are dropped.
    fn from(raw: SerpApiResponse) -> Self {
        let (query, results_count, raw_results) = match raw.data {
            Some(data) if !data.results.is_empty() || raw.results.is_empty() => {
                (data.query, data.results_count, data.results)
            }
            Some(data) => (data.query, data.results_count, raw.results),
            None => (None, None, raw.results),
        };

        let results = raw_results
            .into_iter()
            .enumerate()
            .filter_map(|(idx, item)| {
                let r = SerpApiResult::from_value(&item)?;
                let url = r.url.filter(|u| !u.trim().is_empty())?;
                Some(SerpResult {
                    url,
                    title: r.title.or(r.site_name),
                    snippet: r.description,
                    position: r.ranking.unwrap_or(idx as u32 + 1),
                })
            })
            .collect();

        SerpResponse { query, results_count, results }
    }
}

impl SerpResponse {
    /// Decode an upstream JSON body.
    pub fn from_json(value: Value) -> Result<Self, FetchSerpError> {
        let raw: SerpApiResponse = serde_json::from_value(value).map_err(|e| FetchSerpError::Parse(e.to_string()))?;
        Ok(raw.into())
    }

    pub fn result_count(&self) -> usize {
        self.results.len()
    }
}

/// Page content from `GET /scrape`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScrapedPage {
    pub url: Option<String>,
    pub title: Option<String>,
    pub content: String,
}

impl ScrapedPage {
    /// Pull page content out of a scrape response.
    ///
    /// Looks for `html`, `content`, `text` or `markdown` under `data` first and
    /// then at the top level; a bare string body is taken as the content.
    pub fn from_json(value: &Value) -> Self {
        const CONTENT_KEYS: [&str; 4] = ["html", "content", "text", "markdown"];

        if let Some(text) = value.as_str() {
            return ScrapedPage { content: text.to_string(), ..Default::default() };
        }

        let scopes = [value.get("data"), Some(value)];
        let field = |key: &str| {
            scopes
                .iter()
                .flatten()
                .find_map(|scope| scope.get(key).and_then(Value::as_str))
                .map(str::to_string)
        };

        ScrapedPage {
            url: field("url"),
            title: field("title"),
            content: CONTENT_KEYS.iter().find_map(|&key| field(key)).unwrap_or_default(),
        }
    }
}
