//! Unified error types for wxgate.
//!
//! Every variant carries a stable machine-readable code (see [`Error::code`])
//! that the HTTP layer surfaces in the `code` field of error bodies.

use crate::config::ConfigError;

/// Unified error types for the wxgate proxy.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or malformed request parameters.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// An upstream call exceeded its deadline.
    #[error("UPSTREAM_TIMEOUT: {0}")]
    UpstreamTimeout(String),

    /// Upstream answered with the wrong content type or failed validation.
    #[error("UPSTREAM_INVALID_RESPONSE: {0}")]
    UpstreamInvalidResponse(String),

    /// Upstream answered with a non-2xx status.
    #[error("UPSTREAM_HTTP_ERROR: status {status}")]
    UpstreamHttp { status: u16, body: String },

    /// Race and fallback were both exhausted.
    #[error("ALL_SOURCES_FAILED: {0}")]
    AllSourcesFailed(String),

    /// A required credential or upstream URL is not configured.
    #[error("CONFIG_ERROR: {0}")]
    Configuration(#[from] ConfigError),

    /// Transport-level failure talking to an upstream.
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// Failure inside the proxy itself, such as a panicked worker task.
    #[error("INTERNAL_ERROR: {0}")]
    Internal(String),
}

impl Error {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::UpstreamTimeout(_) => "UPSTREAM_TIMEOUT",
            Error::UpstreamInvalidResponse(_) => "UPSTREAM_INVALID_RESPONSE",
            Error::UpstreamHttp { .. } => "UPSTREAM_HTTP_ERROR",
            Error::AllSourcesFailed(_) => "ALL_SOURCES_FAILED",
            Error::Configuration(_) => "CONFIG_ERROR",
            Error::Network(_) => "NETWORK_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Human readable detail without the code prefix.
    pub fn details(&self) -> String {
        match self {
            Error::InvalidInput(msg)
            | Error::UpstreamTimeout(msg)
            | Error::UpstreamInvalidResponse(msg)
            | Error::AllSourcesFailed(msg)
            | Error::Network(msg)
            | Error::Internal(msg) => msg.clone(),
            Error::UpstreamHttp { status, body } if body.is_empty() => format!("status {status}"),
            Error::UpstreamHttp { status, body } => format!("status {status}: {body}"),
            Error::Configuration(e) => e.to_string(),
        }
    }

    /// Whether the error was caused by the caller rather than an upstream.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}
