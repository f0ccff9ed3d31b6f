//! Cache inspection and purge endpoints.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use wxgate_core::cache::CacheStats;

use crate::state::AppState;

/// Query parameters for `DELETE /api/cache`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurgeParams {
    /// Drop only entries past their TTL instead of everything.
    #[serde(default)]
    pub expired_only: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurgeOutput {
    pub deleted: usize,
}

pub async fn stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}

pub async fn purge(State(state): State<AppState>, Query(params): Query<PurgeParams>) -> Json<PurgeOutput> {
    Json(purge_impl(&state, params))
}

pub fn purge_impl(state: &AppState, params: PurgeParams) -> PurgeOutput {
    let deleted = if params.expired_only { state.cache.sweep() } else { state.cache.clear() };
    tracing::info!(deleted, expired_only = params.expired_only, "cache purged");
    PurgeOutput { deleted }
}
