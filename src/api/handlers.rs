//! API Handlers
//!
//! HTTP request handlers for the cache diagnostics endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use std::collections::BTreeMap;

use crate::cache::CacheRegistry;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, EntryResponse, HealthResponse, InvalidateResponse, SetEntryRequest,
    SetEntryResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// The registry is cheap to clone; every clone points at the same instances.
#[derive(Clone)]
pub struct AppState {
    pub caches: CacheRegistry,
}

impl AppState {
    pub fn new(caches: CacheRegistry) -> Self {
        Self { caches }
    }
}

/// Handler for GET /caches/:name/entries/:key
///
/// Returns the live cached value without triggering a fetch.
pub async fn get_entry_handler(
    State(state): State<AppState>,
    Path((name, key)): Path<(String, String)>,
) -> Result<Json<EntryResponse>> {
    let cache = state.caches.get(&name)?;
    let value = cache
        .get_value(&key)
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(EntryResponse::new(name, key, value)))
}

/// Handler for PUT /caches/:name/entries/:key
///
/// Primes an entry with a caller-supplied value.
pub async fn set_entry_handler(
    State(state): State<AppState>,
    Path((name, key)): Path<(String, String)>,
    Json(req): Json<SetEntryRequest>,
) -> Result<Json<SetEntryResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let cache = state.caches.get(&name)?;
    let ttl = req.ttl();
    cache.set_value(&key, req.value, ttl);

    Ok(Json(SetEntryResponse::new(&name, key)))
}

/// Handler for DELETE /caches/:name/entries/:key
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path((name, key)): Path<(String, String)>,
) -> Result<Json<InvalidateResponse>> {
    state.caches.get(&name)?.invalidate(&key);

    Ok(Json(InvalidateResponse::new(&name, key)))
}

/// Handler for DELETE /caches/:name
pub async fn clear_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ClearResponse>> {
    let cache = state.caches.get(&name)?;
    let removed = cache.get_stats().cache_size;
    cache.clear();

    Ok(Json(ClearResponse::new(&name, removed)))
}

/// Handler for GET /caches/:name/stats
pub async fn cache_stats_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<StatsResponse>> {
    let stats = state.caches.get(&name)?.get_stats();

    Ok(Json(StatsResponse::new(stats)))
}

/// Handler for GET /stats
///
/// Returns statistics for every instance.
pub async fn stats_handler(State(state): State<AppState>) -> Json<BTreeMap<String, StatsResponse>> {
    Json(StatsResponse::all(state.caches.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
