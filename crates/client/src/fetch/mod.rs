//! Deadline-bounded HTTP fetches.
//!
//! ### Deadlines
//! - Every call takes an explicit timeout covering both the request and the
//!   body read.
//! - When the deadline wins, the in-flight request future is dropped, which
//!   cancels the call; the timer belongs to the same future and is released
//!   with it.
//!
//! ### URL construction
//! - Upstream URLs are assembled with [`QueryBuilder`], never by string
//!   concatenation.

pub mod query;

use bytes::Bytes;
use reqwest::header::{self, HeaderMap};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::time::{Duration, Instant};

pub use query::{QueryBuilder, QueryError, decode_credential};

/// Longest slice of an error body kept for diagnostics.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Errors from a single bounded fetch.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Deadline elapsed before the response body was read.
    #[error("timed out after {0}ms")]
    Timeout(u64),

    /// Connection, TLS or body transfer failure.
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx status.
    #[error("HTTP status {status}")]
    Http { status: u16, body: String },

    /// Body is not what the caller expected.
    #[error("invalid response: {0}")]
    Invalid(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl From<FetchError> for wxgate_core::Error {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Timeout(_) => Self::UpstreamTimeout(err.to_string()),
            FetchError::Http { status, body } => Self::UpstreamHttp { status, body },
            FetchError::Invalid(msg) => Self::UpstreamInvalidResponse(msg),
            FetchError::Network(msg) | FetchError::Client(msg) => Self::Network(msg),
        }
    }
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "wxgate/0.1")
    pub user_agent: String,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "wxgate/0.1".to_string(), max_redirects: 5 }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URL requested
    pub url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes
    pub bytes: Bytes,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Whether the Content-Type header declares JSON.
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"))
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> Result<Value, FetchError> {
        serde_json::from_slice(&self.bytes).map_err(|e| FetchError::Invalid(format!("body is not JSON: {e}")))
    }

    /// Turn a non-2xx response into `FetchError::Http`.
    pub fn error_for_status(self) -> Result<Self, FetchError> {
        if self.status.is_success() {
            return Ok(self);
        }

        let body: String = String::from_utf8_lossy(&self.bytes).chars().take(MAX_ERROR_BODY_CHARS).collect();
        Err(FetchError::Http { status: self.status.as_u16(), body })
    }
}

/// HTTP client whose every call carries its own deadline.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: Client,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { http })
    }

    /// GET `url`, failing with `Timeout` if it takes longer than `timeout`.
    pub async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchResponse, FetchError> {
        self.fetch_with_headers(url, HeaderMap::new(), timeout).await
    }

    /// GET `url` with extra request headers under a deadline.
    pub async fn fetch_with_headers(
        &self, url: &Url, headers: HeaderMap, timeout: Duration,
    ) -> Result<FetchResponse, FetchError> {
        let start = Instant::now();
        let request = self.http.get(url.clone()).headers(headers);

        let exchange = async {
            let response = request
                .send()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;

            let status = response.status();
            let content_type = response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string());

            let bytes = response
                .bytes()
                .await
                .map_err(|e| FetchError::Network(format!("failed to read response: {e}")))?;

            Ok::<_, FetchError>((status, content_type, bytes))
        };

        let (status, content_type, bytes) = match tokio::time::timeout(timeout, exchange).await {
            Ok(result) => result?,
            Err(_) => {
                let ms = timeout.as_millis() as u64;
                tracing::warn!(host = url.host_str().unwrap_or(""), path = url.path(), "upstream timed out after {ms}ms");
                return Err(FetchError::Timeout(ms));
            }
        };

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            host = url.host_str().unwrap_or(""),
            path = url.path(),
            status = status.as_u16(),
            "fetched in {}ms ({} bytes)",
            fetch_ms,
            bytes.len()
        );

        Ok(FetchResponse { url: url.clone(), status, content_type, bytes, fetch_ms })
    }
}
