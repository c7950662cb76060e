//! Favorites handlers
//!
//! `GET /favorites` lists a user's favorite movies and `POST /favorites`
//! toggles one movie: it is removed when present and added otherwise.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::canary::Canary;
use crate::error::{AppError, StoreOperation};
use crate::state::AppState;
use crate::store::{FavoritesStore, MovieId};

/// Query string pairs in request order
///
/// Kept as raw pairs so a repeated `user_id` resolves to its first value
/// instead of being rejected.
pub type QueryPairs = Vec<(String, String)>;

/// Body of `POST /favorites`
#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    /// Movie to toggle
    pub id: MovieId,
}

/// Favorites set in store order
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct FavoritesResponse {
    /// Movie ids currently in the set
    pub favorites: Vec<MovieId>,
}

/// GET / - Greeting
pub async fn hello_world() -> &'static str {
    info!("Main request successful");
    "Hello World!"
}

/// GET /favorites?user_id= - List favorites
pub async fn get_favorites(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QueryPairs>,
) -> Result<Json<FavoritesResponse>, AppError> {
    artificial_delay(state.config.delays.request_delay).await;

    let user_id = first_user_id(&query);
    info!(user = %user_id, "Getting favorites");

    let favorites = fetch_favorites(state.store.as_ref(), &user_id).await?;

    Ok(Json(FavoritesResponse { favorites }))
}

/// POST /favorites?user_id= - Toggle one movie
pub async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QueryPairs>,
    body: Bytes,
) -> Result<Json<FavoritesResponse>, AppError> {
    artificial_delay(state.config.delays.request_delay).await;

    let user_id = first_user_id(&query);
    info!(user = %user_id, "Adding or removing favorites");

    let request: ToggleRequest =
        serde_json::from_slice(&body).map_err(|source| AppError::BadRequest {
            user_id: user_id.clone(),
            source,
        })?;

    toggle(state.store.as_ref(), &user_id, request.id).await?;
    let favorites = fetch_favorites(state.store.as_ref(), &user_id).await?;

    apply_canary(&state.config.delays.canary, &user_id).await;

    Ok(Json(FavoritesResponse { favorites }))
}

/// Remove `id` if present, add it otherwise.
///
/// A failed remove aborts before any add is attempted.
pub async fn toggle(
    store: &dyn FavoritesStore,
    user_id: &str,
    id: MovieId,
) -> Result<(), AppError> {
    let removed = store
        .remove(user_id, id)
        .await
        .map_err(|e| AppError::store(StoreOperation::Remove, user_id, e))?;

    if removed == 0 {
        store
            .add(user_id, id)
            .await
            .map_err(|e| AppError::store(StoreOperation::Add, user_id, e))?;
    }

    Ok(())
}

/// First `user_id` in the query string, empty when absent
pub fn first_user_id(query: &[(String, String)]) -> String {
    query
        .iter()
        .find(|(key, _)| key == "user_id")
        .map(|(_, value)| value.clone())
        .unwrap_or_default()
}

async fn fetch_favorites(
    store: &dyn FavoritesStore,
    user_id: &str,
) -> Result<Vec<MovieId>, AppError> {
    let favorites = store
        .members(user_id)
        .await
        .map_err(|e| AppError::store(StoreOperation::Fetch, user_id, e))?;

    info!(user = %user_id, ?favorites, "Found favorites");
    Ok(favorites)
}

async fn artificial_delay(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

// Panics on an injected fault; the router's panic boundary turns that into a 500.
async fn apply_canary(canary: &Canary, user_id: &str) {
    let plan = canary.plan(&mut rand::thread_rng());
    let Some(delay) = plan.delay else {
        return;
    };

    tokio::time::sleep(delay).await;
    info!(user = %user_id, delay_ms = delay.as_millis() as u64, "Canary enabled");

    if let Err(fault) = plan.outcome() {
        error!(user = %user_id, "{}", fault);
        panic!("{}", fault);
    }
}
