//! HTTP error responses for the wxgate server.
//!
//! Every failure is rendered as JSON carrying a human `error` message, the
//! machine-readable `code` from [`wxgate_core::Error::code`], `details`, and
//! the endpoint's safe default so the map UI can keep rendering.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use wxgate_core::Error;

/// Address shown when a coordinate cannot be resolved.
pub const DEFAULT_ADDRESS: &str = "현재위치";

/// Safe default payload merged into an error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fallback {
    #[default]
    None,
    /// `documents: []` for address search.
    Documents,
    /// `address: "현재위치"` for coordinate lookup.
    Address,
}

/// Error returned from route handlers.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    message: String,
    error: Error,
    fallback: Fallback,
}

impl ApiError {
    pub fn new(message: impl Into<String>, error: Error) -> Self {
        Self { message: message.into(), error, fallback: Fallback::None }
    }

    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// 400 for caller mistakes, 500 for everything upstream or config related.
    pub fn status(&self) -> StatusCode {
        if self.error.is_client_error() { StatusCode::BAD_REQUEST } else { StatusCode::INTERNAL_SERVER_ERROR }
    }

    pub fn body(&self) -> Value {
        let mut body = json!({
            "error": self.message,
            "code": self.error.code(),
            "details": self.error.details(),
        });

        match self.fallback {
            Fallback::None => {}
            Fallback::Documents => body["documents"] = json!([]),
            Fallback::Address => body["address"] = json!(DEFAULT_ADDRESS),
        }

        body
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self::new(error.details(), error)
    }
}

/// Unreadable JSON bodies are caller mistakes like any other bad input.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidInput(rejection.body_text()).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(code = self.error.code(), error = %self.error, "{}", self.message);
        } else {
            tracing::warn!(code = self.error.code(), "{}", self.message);
        }

        (status, Json(self.body())).into_response()
    }
}
