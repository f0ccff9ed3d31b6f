//! Short and mid-range forecast endpoints.

use axum::{
    Json,
    extract::{Query, State},
};
use serde_json::Value;
use std::collections::HashMap;

use wxgate_client::{ForecastKind, ForecastRequest};
use wxgate_core::Error;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn short(
    State(state): State<AppState>, Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    forecast_impl(&state, ForecastKind::Short, &params).await.map(Json)
}

pub async fn mid_ta(
    State(state): State<AppState>, Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    forecast_impl(&state, ForecastKind::MidTa, &params).await.map(Json)
}

pub async fn mid_land(
    State(state): State<AppState>, Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    forecast_impl(&state, ForecastKind::MidLand, &params).await.map(Json)
}

/// Validate query parameters for `kind` and resolve the forecast.
pub async fn forecast_impl(
    state: &AppState, kind: ForecastKind, params: &HashMap<String, String>,
) -> Result<Value, ApiError> {
    let req = ForecastRequest::from_params(kind, params)?;

    match resolve(state, &req).await {
        Ok((payload, _)) => Ok(payload),
        Err(err @ (Error::Configuration(_) | Error::InvalidInput(_))) => Err(err.into()),
        Err(err) => Err(ApiError::new(format!("{} request failed", kind.label()), err)),
    }
}

/// Serve `req` from the cache, or fetch and cache it.
///
/// Returns the payload and whether it was a cache hit. Shared with the batch
/// endpoint so both populate the same keys.
pub async fn resolve(state: &AppState, req: &ForecastRequest) -> Result<(Value, bool), Error> {
    let key = req.cache_key();

    if let Some(hit) = state.cache.get(&key) {
        tracing::debug!(kind = %req.kind(), "forecast cache hit");
        return Ok((hit, true));
    }

    let result = state.weather.forecast(req).await?;
    tracing::info!(kind = %req.kind(), source = %result.source, "forecast resolved");

    state.cache.put(key, result.payload.clone());
    Ok((result.payload, false))
}
