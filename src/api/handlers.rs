//! API Handlers
//!
//! HTTP request handlers for the cache and check-in endpoints.
//! Every handler is generic over the store backend.

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use crate::cache::Cache;
use crate::checkin::{CheckIn, UserId};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, HealthResponse, SetResponse, SetValueRequest, SignRangeResponse,
    SignResponse, SignStatusResponse, ValueResponse,
};
use crate::store::KeyValueStore;

/// Application state shared across all handlers.
///
/// Both halves hold a clone of the same store handle; the store handles
/// its own synchronization.
#[derive(Debug, Clone)]
pub struct AppState<S> {
    /// Alias router for the cache endpoints
    pub cache: Cache<S>,
    /// Daily check-in bitmaps
    pub check_in: CheckIn<S>,
}

impl<S: KeyValueStore> AppState<S> {
    /// Creates a new AppState with default TTL and key prefix.
    pub fn new(store: S) -> Self {
        Self {
            cache: Cache::new(store.clone()),
            check_in: CheckIn::new(store),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Applies the configured default TTL and check-in key prefix.
    pub fn from_config(store: S, config: &Config) -> Self {
        Self {
            cache: Cache::new(store.clone()).with_default_ttl(config.default_ttl),
            check_in: CheckIn::new(store).with_prefix(config.check_in_prefix.clone()),
        }
    }
}

/// Handler for PUT /cache/:alias/:key
///
/// Stores a JSON value under `alias ++ key`, using the request TTL when
/// given and the configured default otherwise.
pub async fn set_handler<S: KeyValueStore>(
    State(state): State<AppState<S>>,
    Path((alias, key)): Path<(String, String)>,
    Json(req): Json<SetValueRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let proxy = state.cache.proxy_for(alias.as_str());
    let ttl = req.ttl.unwrap_or_else(|| proxy.ttl());
    proxy.set_ex(&key, &req.value, ttl).await?;

    Ok(Json(SetResponse::new(alias, key)))
}

/// Handler for GET /cache/:alias/:key
///
/// Returns the decoded value; an absent key yields an empty string.
pub async fn get_handler<S: KeyValueStore>(
    State(state): State<AppState<S>>,
    Path((alias, key)): Path<(String, String)>,
) -> Result<Json<ValueResponse>> {
    let value = state.cache.proxy_for(alias.as_str()).get_decoded(&key).await?;

    Ok(Json(ValueResponse::new(alias, key, value)))
}

/// Handler for DELETE /cache/:alias/:key
pub async fn delete_handler<S: KeyValueStore>(
    State(state): State<AppState<S>>,
    Path((alias, key)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>> {
    let deleted = state.cache.proxy_for(alias.as_str()).delete(&key).await?;

    Ok(Json(DeleteResponse::new(alias, key, deleted)))
}

/// Handler for POST /checkin/:user_id
///
/// Marks today as checked in and reports the bit's previous value.
pub async fn sign_handler<S: KeyValueStore>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<String>,
) -> Result<Json<SignResponse>> {
    let user: UserId = user_id.parse()?;
    let previous = state.check_in.sign(user).await?;

    Ok(Json(SignResponse::new(user, previous)))
}

/// Handler for GET /checkin/:user_id
pub async fn sign_status_handler<S: KeyValueStore>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<String>,
) -> Result<Json<SignStatusResponse>> {
    let user: UserId = user_id.parse()?;
    let bit = state.check_in.sign_status(user).await?;

    Ok(Json(SignStatusResponse::new(user, bit)))
}

/// Handler for GET /checkin/:user_id/week
///
/// Monday through today, oldest first.
pub async fn week_handler<S: KeyValueStore>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<String>,
) -> Result<Json<SignRangeResponse>> {
    let user: UserId = user_id.parse()?;
    let days = state.check_in.week_sign_status(user).await?;
    debug!(user = %user, days = days.len(), "week status");

    Ok(Json(SignRangeResponse::new(user, days)))
}

/// Handler for GET /checkin/:user_id/month
///
/// The 1st of the month through today, oldest first.
pub async fn month_handler<S: KeyValueStore>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<String>,
) -> Result<Json<SignRangeResponse>> {
    let user: UserId = user_id.parse()?;
    let days = state.check_in.month_sign_status(user).await?;
    debug!(user = %user, days = days.len(), "month status");

    Ok(Json(SignRangeResponse::new(user, days)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
