//! FetchSERP client error types.

use std::sync::Arc;

use fetchserp_core::Error;

/// Errors from the FetchSERP API client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchSerpError {
    /// No API token configured.
    #[error("missing API token: FETCHSERP_API_TOKEN not set")]
    MissingApiToken,

    /// Request parameters failed validation.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Authentication failed (401/403).
    #[error("authentication failed: HTTP {status}")]
    AuthError { status: u16 },

    /// Rate limited by FetchSERP (429).
    #[error("rate limited: too many requests")]
    RateLimited,

    /// Any other non-2xx response.
    #[error("HTTP error {status}: {body}")]
    Status { status: u16, body: String },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FetchSerpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { FetchSerpError::Timeout } else { FetchSerpError::Network(Arc::new(err)) }
    }
}

impl From<FetchSerpError> for Error {
    fn from(err: FetchSerpError) -> Self {
        match err {
            FetchSerpError::MissingApiToken => Error::MissingApiToken(err.to_string()),
            FetchSerpError::InvalidRequest(msg) => Error::InvalidInput(msg),
            FetchSerpError::AuthError { .. } => Error::UpstreamAuth(err.to_string()),
            FetchSerpError::RateLimited => Error::UpstreamRateLimited(err.to_string()),
            FetchSerpError::Status { .. } | FetchSerpError::Network(_) => Error::UpstreamHttp(err.to_string()),
            FetchSerpError::Timeout => Error::UpstreamTimeout(err.to_string()),
            FetchSerpError::Parse(msg) => Error::UpstreamParse(msg),
        }
    }
}
