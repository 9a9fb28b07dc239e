//! Unified error types for mcp-fetchserp.
//!
//! Each variant carries a stable code prefix and maps onto a JSON-RPC error code
//! in the implementation-defined server range, so upstream failures are never
//! confused with method dispatch (-32601) or parse (-32700) errors.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error types for the mcp-fetchserp server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid tool arguments (e.g., empty query).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Upstream answered with a non-success status.
    #[error("UPSTREAM_HTTP_ERROR: {0}")]
    UpstreamHttp(String),

    /// Upstream rejected the API token.
    #[error("UPSTREAM_AUTH_ERROR: {0}")]
    UpstreamAuth(String),

    /// Upstream rate limited the request.
    #[error("UPSTREAM_RATE_LIMITED: {0}")]
    UpstreamRateLimited(String),

    /// Upstream did not answer within the configured timeout.
    #[error("UPSTREAM_TIMEOUT: {0}")]
    UpstreamTimeout(String),

    /// Upstream body could not be decoded.
    #[error("UPSTREAM_PARSE_ERROR: {0}")]
    UpstreamParse(String),

    /// No API token configured.
    #[error("MISSING_API_TOKEN: {0}")]
    MissingApiToken(String),
}

impl Error {
    /// JSON-RPC error code for this error.
    pub fn code(&self) -> i32 {
        match self {
            Error::InvalidInput(_) => -32602,
            Error::UpstreamHttp(_) => -32001,
            Error::UpstreamAuth(_) => -32002,
            Error::UpstreamRateLimited(_) => -32003,
            Error::UpstreamTimeout(_) => -32004,
            Error::UpstreamParse(_) => -32005,
            Error::MissingApiToken(_) => -32006,
        }
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = err.code();
        let message = match err {
            Error::InvalidInput(msg)
            | Error::UpstreamHttp(msg)
            | Error::UpstreamAuth(msg)
            | Error::UpstreamRateLimited(msg)
            | Error::UpstreamTimeout(msg)
            | Error::UpstreamParse(msg)
            | Error::MissingApiToken(msg) => msg,
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
