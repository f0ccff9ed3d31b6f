//! Kakao Local API client error types.

use wxgate_core::ConfigError;

use crate::fetch::FetchError;

/// Errors from the Kakao Local API client.
#[derive(Debug, thiserror::Error)]
pub enum KakaoError {
    /// API key or endpoint not configured.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Authentication failed (invalid API key).
    #[error("authentication failed: invalid API key")]
    AuthError,

    /// HTTP error response.
    #[error("kakao upstream error ({status})")]
    HttpError { status: u16, body: String },

    /// Response was not served as JSON.
    #[error("kakao returned a non-JSON response ({content_type})")]
    NotJson { content_type: String },

    /// Request timeout.
    #[error("request timeout after {0}ms")]
    Timeout(u64),

    /// Network error.
    #[error("network error: {0}")]
    Network(String),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<FetchError> for KakaoError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Timeout(ms) => KakaoError::Timeout(ms),
            FetchError::Http { status: 401 | 403, .. } => KakaoError::AuthError,
            FetchError::Http { status, body } => KakaoError::HttpError { status, body },
            FetchError::Invalid(msg) => KakaoError::Parse(msg),
            FetchError::Network(msg) | FetchError::Client(msg) => KakaoError::Network(msg),
        }
    }
}

impl From<KakaoError> for wxgate_core::Error {
    fn from(err: KakaoError) -> Self {
        match err {
            KakaoError::Config(e) => Self::Configuration(e),
            KakaoError::AuthError => Self::UpstreamHttp { status: 401, body: err.to_string() },
            KakaoError::HttpError { status, body } => Self::UpstreamHttp { status, body },
            KakaoError::NotJson { .. } | KakaoError::Parse(_) => Self::UpstreamInvalidResponse(err.to_string()),
            KakaoError::Timeout(_) => Self::UpstreamTimeout(err.to_string()),
            KakaoError::Network(msg) => Self::Network(msg),
        }
    }
}
