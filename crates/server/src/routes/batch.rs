//! Batched forecast endpoint.
//!
//! Every sub-request is validated before any upstream call, then all are
//! resolved concurrently. Results keep input order. A single failure fails
//! the whole batch.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::task::{JoinError, JoinSet};

use wxgate_client::{ForecastKind, ForecastRequest};
use wxgate_core::Error;

use crate::error::ApiError;
use crate::routes::weather::resolve;
use crate::state::AppState;

/// Body of `POST /api/weather/batch`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchParams {
    #[serde(default)]
    pub requests: Vec<BatchItem>,
}

/// One forecast in a batch.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchItem {
    /// `short`, `mid-ta` or `mid-land`.
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub params: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    #[serde(rename = "type")]
    pub kind: ForecastKind,
    pub data: Value,
    /// Whether `data` came from the cache.
    pub cached: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchOutput {
    pub results: Vec<BatchResult>,
}

pub async fn batch(
    State(state): State<AppState>, body: Result<Json<BatchParams>, JsonRejection>,
) -> Result<Json<BatchOutput>, ApiError> {
    let Json(params) = body?;
    batch_impl(&state, params).await.map(Json)
}

pub async fn batch_impl(state: &AppState, params: BatchParams) -> Result<BatchOutput, ApiError> {
    let requests = params
        .requests
        .iter()
        .map(|item| ForecastRequest::from_json(item.kind.parse()?, &item.params))
        .collect::<Result<Vec<_>, Error>>()?;

    let total = requests.len();
    let mut join_set = JoinSet::new();

    for (index, req) in requests.into_iter().enumerate() {
        let state = state.clone();
        join_set.spawn(async move {
            let result = resolve(&state, &req).await;
            (index, req.kind(), result)
        });
    }

    let mut slots: Vec<Option<BatchResult>> = vec![None; total];

    while let Some(joined) = join_set.join_next().await {
        let (index, kind, result) = joined.map_err(join_error)?;
        let (data, cached) = result.map_err(batch_error)?;
        slots[index] = Some(BatchResult { kind, data, cached });
    }

    let results: Vec<BatchResult> = slots.into_iter().flatten().collect();
    tracing::info!(count = results.len(), cached = results.iter().filter(|r| r.cached).count(), "batch resolved");

    Ok(BatchOutput { results })
}

fn join_error(err: JoinError) -> ApiError {
    tracing::error!(error = %err, "batch sub-request task failed");
    ApiError::new("batch weather request failed", Error::Internal(err.to_string()))
}

fn batch_error(err: Error) -> ApiError {
    match err {
        Error::Configuration(_) => err.into(),
        _ => ApiError::new("batch weather request failed", err),
    }
}
