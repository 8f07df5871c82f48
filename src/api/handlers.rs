//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::{Cache, CacheConfig, MemoryCache};
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, ExistsResponse, FlushResponse, GetResponse, HealthResponse, KeysResponse,
    MaxMemoryRequest, MaxMemoryResponse, SetRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// The cache is a cheap-to-clone handle; its table has its own lock.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache of JSON values
    pub cache: Cache<Value>,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: Cache<Value>) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Must be called from within a Tokio runtime, which hosts the sweeper.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::with_cache_config(config.cache_config(), config.default_ttl())
    }

    /// Creates a new AppState with explicit engine parameters.
    pub fn with_cache_config(cache_config: CacheConfig, default_ttl: Duration) -> Self {
        let cache = Cache::from_engine(MemoryCache::new(cache_config)).with_default_ttl(default_ttl);
        Self::new(cache)
    }
}

/// Handler for PUT /set
///
/// Stores a JSON value in the cache with optional TTL in seconds.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req
        .ttl
        .map(Duration::from_secs)
        .unwrap_or_else(|| state.cache.default_ttl());
    state.cache.engine().set(req.key.clone(), req.value, ttl)?;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from the cache by key.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.get(&key) {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /del/:key
///
/// Deletes a key from the cache. Succeeds whether or not the key existed.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    let deleted = state.cache.engine().delete(&key);
    Json(DeleteResponse::new(key, deleted))
}

/// Handler for GET /exists/:key
pub async fn exists_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<ExistsResponse> {
    let exists = state.cache.exists(&key);
    Json(ExistsResponse { key, exists })
}

/// Handler for POST /flush
pub async fn flush_handler(State(state): State<AppState>) -> Json<FlushResponse> {
    let removed = state.cache.engine().flush();
    Json(FlushResponse::new(removed))
}

/// Handler for GET /keys
pub async fn keys_handler(State(state): State<AppState>) -> Json<KeysResponse> {
    Json(KeysResponse {
        count: state.cache.keys(),
    })
}

/// Handler for PUT /max-memory
///
/// Applies a new memory ceiling. Unparseable sizes fall back to the default.
pub async fn max_memory_handler(
    State(state): State<AppState>,
    Json(req): Json<MaxMemoryRequest>,
) -> Json<MaxMemoryResponse> {
    let (max_memory, parsed) = state.cache.engine().set_max_memory(&req.size);

    Json(MaxMemoryResponse {
        size: req.size,
        max_memory,
        parsed,
    })
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.engine().stats()))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
