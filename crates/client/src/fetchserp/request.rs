//! FetchSERP SERP request types and validation.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::FetchSerpError;

static COUNTRY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z]{2}$").expect("country regex is valid"));

/// Search engines the SERP endpoint can query.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    #[default]
    Google,
    Bing,
    Yahoo,
    Duckduckgo,
}

impl SearchEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchEngine::Google => "google",
            SearchEngine::Bing => "bing",
            SearchEngine::Yahoo => "yahoo",
            SearchEngine::Duckduckgo => "duckduckgo",
        }
    }
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchEngine {
    type Err = FetchSerpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(SearchEngine::Google),
            "bing" => Ok(SearchEngine::Bing),
            "yahoo" => Ok(SearchEngine::Yahoo),
            "duckduckgo" => Ok(SearchEngine::Duckduckgo),
            other => Err(FetchSerpError::InvalidRequest(format!("unsupported search_engine: {other}"))),
        }
    }
}

/// Parameters for `GET /serp`.
#[derive(Debug, Clone, Default)]
pub struct SerpRequest {
    /// Search query (required, max 400 chars).
    pub query: String,

    /// Engine to query (default google).
    pub search_engine: Option<SearchEngine>,

    /// Country code (ISO 3166-1 alpha-2, default "us").
    pub country: Option<String>,

    /// Number of result pages to collect (1-30, default 1).
    pub pages_number: Option<u8>,
}

impl SerpRequest {
    /// Validate the request parameters.
    pub fn validate(&self) -> Result<(), FetchSerpError> {
        let query = self.query.trim();
        if query.is_empty() {
            return Err(FetchSerpError::InvalidRequest("query cannot be empty".to_string()));
        }

        let chars = query.chars().count();
        if chars > 400 {
            return Err(FetchSerpError::InvalidRequest(format!("query too long: {chars} chars (max 400)")));
        }

        if let Some(country) = &self.country
            && !COUNTRY_RE.is_match(country)
        {
            return Err(FetchSerpError::InvalidRequest(format!(
                "invalid country: {country} (expected ISO 3166-1 alpha-2)"
            )));
        }

        if let Some(pages) = self.pages_number
            && !(1..=30).contains(&pages)
        {
            return Err(FetchSerpError::InvalidRequest("pages_number must be 1-30".to_string()));
        }

        Ok(())
    }

    pub fn get_search_engine(&self) -> SearchEngine {
        self.search_engine.unwrap_or_default()
    }

    pub fn get_country(&self) -> String {
        self.country.as_deref().unwrap_or("us").to_ascii_lowercase()
    }

    pub fn get_pages_number(&self) -> u8 {
        self.pages_number.unwrap_or(1)
    }

    /// Query-string parameters with defaults filled in.
    pub fn to_params(&self) -> Value {
        serde_json::json!({
            "query": self.query.trim(),
            "search_engine": self.get_search_engine().as_str(),
            "country": self.get_country(),
            "pages_number": self.get_pages_number(),
        })
    }
}
