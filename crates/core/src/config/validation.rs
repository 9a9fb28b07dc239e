//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::{AppConfig, Transport};
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `cache_ttl_secs` is 0 or exceeds 24 hours
    /// - `cache_sweep_interval_secs` is 0
    /// - `default_top_k` is 0 or larger than `max_top_k`
    /// - `max_top_k` exceeds 100
    /// - `max_concurrency` is outside 1..=16
    /// - `max_fetch_ids` is outside 1..=200
    /// - `user_agent` is empty
    /// - `base_url` is not an http(s) URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.cache_ttl_secs == 0 {
            return Err(invalid("cache_ttl_secs", "must be greater than 0"));
        }
        if self.cache_ttl_secs > 86_400 {
            return Err(invalid("cache_ttl_secs", "must not exceed 24 hours (86400s)"));
        }

        if self.cache_sweep_interval_secs == 0 {
            return Err(invalid("cache_sweep_interval_secs", "must be greater than 0"));
        }

        if self.max_top_k == 0 || self.max_top_k > 100 {
            return Err(invalid("max_top_k", "must be between 1 and 100"));
        }
        if self.default_top_k == 0 || self.default_top_k > self.max_top_k {
            return Err(invalid("default_top_k", "must be between 1 and max_top_k"));
        }

        if !(1..=16).contains(&self.max_concurrency) {
            return Err(invalid("max_concurrency", "must be between 1 and 16"));
        }

        if !(1..=200).contains(&self.max_fetch_ids) {
            return Err(invalid("max_fetch_ids", "must be between 1 and 200"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        match url::Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(invalid("base_url", "must be an http(s) URL")),
        }

        if self.transport == Transport::Http && self.host.is_empty() {
            return Err(invalid("host", "must not be empty for the http transport"));
        }

        if self.cache_sweep_interval_secs > self.cache_ttl_secs {
            tracing::warn!(
                sweep_interval_secs = self.cache_sweep_interval_secs,
                ttl_secs = self.cache_ttl_secs,
                "cache_sweep_interval_secs exceeds cache_ttl_secs; \
                 expired entries may linger until the next sweep"
            );
        }

        Ok(())
    }
}
