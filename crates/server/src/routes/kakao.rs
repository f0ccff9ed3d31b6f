//! Kakao address search and reverse geocoding endpoints.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use wxgate_client::KakaoError;
use wxgate_core::{CacheKey, Error};

use crate::error::{ApiError, DEFAULT_ADDRESS, Fallback};
use crate::state::AppState;

/// Cache tag for address search results.
pub const SEARCH_TAG: &str = "kakao-search";

/// Cache tag for coordinate lookups.
pub const COORD2ADDRESS_TAG: &str = "coord2address";

/// Query parameters for `GET /api/kakao/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: Option<String>,
}

/// Query parameters for `GET /api/kakao/coord2address`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoordParams {
    #[serde(default)]
    pub x: Option<String>,
    #[serde(default)]
    pub y: Option<String>,
}

pub async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<Value>, ApiError> {
    search_impl(&state, params).await.map(Json)
}

pub async fn coord2address(
    State(state): State<AppState>, Query(params): Query<CoordParams>,
) -> Result<Json<Value>, ApiError> {
    coord2address_impl(&state, params).await.map(Json)
}

/// Neighborhood search with caching.
///
/// Queries shorter than `min_query_chars` return no documents without
/// touching the cache or Kakao.
pub async fn search_impl(state: &AppState, params: SearchParams) -> Result<Value, ApiError> {
    let query = params.query.as_deref().unwrap_or_default().trim();

    if query.chars().count() < state.config.min_query_chars {
        return Ok(empty_documents());
    }

    let key = CacheKey::new(SEARCH_TAG, [("query", query)]);
    if let Some(hit) = state.cache.get(&key) {
        tracing::debug!(query, "kakao search cache hit");
        return Ok(hit);
    }

    let documents = state
        .kakao
        .search(query)
        .await
        .map_err(|e| kakao_error(e, Fallback::Documents))?;

    let Some(documents) = documents else {
        return Ok(empty_documents());
    };

    tracing::info!(query, count = documents.len(), "kakao search resolved");

    let payload = json!({ "documents": documents });
    state.cache.put(key, payload.clone());
    Ok(payload)
}

/// Reverse geocoding with caching.
///
/// Points Kakao cannot resolve answer with the default address and are not
/// cached.
pub async fn coord2address_impl(state: &AppState, params: CoordParams) -> Result<Value, ApiError> {
    let (Some(x), Some(y)) = (non_blank(&params.x), non_blank(&params.y)) else {
        return Err(
            ApiError::from(Error::InvalidInput("x and y are required".into())).with_fallback(Fallback::Address)
        );
    };

    let key = CacheKey::new(COORD2ADDRESS_TAG, [("x", x), ("y", y)]);
    if let Some(hit) = state.cache.get(&key) {
        tracing::debug!(x, y, "coord2address cache hit");
        return Ok(hit);
    }

    let address = state
        .kakao
        .coord2address(x, y)
        .await
        .map_err(|e| kakao_error(e, Fallback::Address))?;

    match address {
        Some(address) => {
            let payload = json!({ "address": address });
            state.cache.put(key, payload.clone());
            Ok(payload)
        }
        None => Ok(json!({ "address": DEFAULT_ADDRESS })),
    }
}

fn empty_documents() -> Value {
    json!({ "documents": [] })
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn kakao_error(err: KakaoError, fallback: Fallback) -> ApiError {
    let message = err.to_string();
    ApiError::new(message, err.into()).with_fallback(fallback)
}
