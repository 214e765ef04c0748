//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::debug;

use crate::cache::Cache;
use crate::error::{CacheError, Result};

/// Application state shared across all handlers.
///
/// Holds whichever backend was selected at startup.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<dyn Cache>,
}

impl AppState {
    /// Creates a new AppState around a shared cache.
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }

    /// Creates a new AppState taking ownership of a cache backend.
    pub fn from_cache<C: Cache + 'static>(cache: C) -> Self {
        Self::new(Arc::new(cache))
    }
}

/// Handler for GET /:key
///
/// Returns the raw value as the response body.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<String> {
    if key.is_empty() {
        return Err(CacheError::NotFound(key));
    }
    debug!(key = %key, "Received GET key request");

    match state.cache.get(&key).await {
        Some(value) => {
            debug!(key = %key, "Cache hit");
            Ok(value)
        }
        None => {
            debug!(key = %key, "Cache miss");
            Err(CacheError::NotFound(key))
        }
    }
}

/// Handler for POST /:key
///
/// Stores the request body under `key`. The body must be non-empty UTF-8.
pub async fn set_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Bytes,
) -> Result<StatusCode> {
    if key.is_empty() {
        return Err(CacheError::InvalidRequest("Key cannot be empty".to_string()));
    }
    debug!(key = %key, "Received POST key request");

    if body.is_empty() {
        return Err(CacheError::InvalidRequest(
            "Value cannot be empty".to_string(),
        ));
    }

    let value = String::from_utf8(body.to_vec())
        .map_err(|_| CacheError::InvalidRequest("Value must be valid UTF-8".to_string()))?;

    state.cache.set(&key, value).await?;
    Ok(StatusCode::CREATED)
}

/// Handler for GET / (no key)
pub async fn missing_key_get_handler() -> CacheError {
    CacheError::NotFound(String::new())
}

/// Handler for POST / (no key)
pub async fn missing_key_set_handler() -> CacheError {
    CacheError::InvalidRequest("Key cannot be empty".to_string())
}
