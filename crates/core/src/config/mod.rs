//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (MCP_FETCHSERP_*)
//! 2. Legacy gateway variables (FETCHSERP_API_TOKEN, PORT)
//! 3. TOML config file (if MCP_FETCHSERP_CONFIG_FILE set)
//! 4. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Transport the MCP server listens on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// JSON-RPC over stdin/stdout.
    #[default]
    Stdio,
    /// Streamable HTTP on `host:port`.
    Http,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (MCP_FETCHSERP_*)
/// 2. FETCHSERP_API_TOKEN and PORT
/// 3. TOML config file (if MCP_FETCHSERP_CONFIG_FILE set)
/// 4. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// FetchSERP bearer token.
    ///
    /// Set via MCP_FETCHSERP_API_TOKEN or FETCHSERP_API_TOKEN.
    /// Required only when an upstream call is made.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Base URL of the FetchSERP REST API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent string for upstream requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Upstream request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// How long search result ids stay resolvable, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Minimum spacing between opportunistic cache sweeps, in seconds.
    #[serde(default = "default_cache_sweep_interval_secs")]
    pub cache_sweep_interval_secs: u64,

    /// Results kept per search when the caller does not pass `top_k`.
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,

    /// Upper bound on `top_k`.
    #[serde(default = "default_max_top_k")]
    pub max_top_k: usize,

    /// Concurrent content retrievals per fetch call.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Upper bound on ids accepted by one fetch call.
    #[serde(default = "default_max_fetch_ids")]
    pub max_fetch_ids: usize,

    /// Transport to serve on.
    #[serde(default)]
    pub transport: Transport,

    /// Bind host for the HTTP transport.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port for the HTTP transport.
    ///
    /// Set via MCP_FETCHSERP_PORT or PORT.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_base_url() -> String {
    "https://api.fetchserp.com/api/v1".into()
}

fn default_user_agent() -> String {
    "mcp-fetchserp/0.1".into()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_cache_ttl_secs() -> u64 {
    1_800 // 30 minutes
}

fn default_cache_sweep_interval_secs() -> u64 {
    60
}

fn default_top_k() -> usize {
    10
}

fn default_max_top_k() -> usize {
    50
}

fn default_max_concurrency() -> usize {
    4
}

fn default_max_fetch_ids() -> usize {
    50
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    8000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_sweep_interval_secs: default_cache_sweep_interval_secs(),
            default_top_k: default_top_k(),
            max_top_k: default_max_top_k(),
            max_concurrency: default_max_concurrency(),
            max_fetch_ids: default_max_fetch_ids(),
            transport: Transport::default(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Cache TTL as a chrono duration.
    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_ttl_secs as i64)
    }

    /// Sweep interval as a chrono duration.
    pub fn cache_sweep_interval(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_sweep_interval_secs as i64)
    }

    /// `host:port` for the HTTP transport.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment()
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("MCP_FETCHSERP_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment
            .merge(
                Env::raw()
                    .only(&["FETCHSERP_API_TOKEN", "PORT"])
                    .map(|key| {
                        if key.as_str().eq_ignore_ascii_case("PORT") { "port".into() } else { "api_token".into() }
                    }),
            )
            .merge(
                Env::prefixed("MCP_FETCHSERP_")
                    .ignore(&["CONFIG_FILE"])
                    .map(|key| key.as_str().to_lowercase().into())
                    .split("__"),
            )
    }

    /// Check that an API token is available (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the token is not set or blank.
    pub fn require_api_token(&self) -> Result<&str, ConfigError> {
        self.api_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "api_token".into(),
                hint: "Set FETCHSERP_API_TOKEN (get one at https://www.fetchserp.com)".into(),
            })
    }
}
