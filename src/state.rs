//! Shared handler state

use std::sync::Arc;

use crate::config::Config;
use crate::store::FavoritesStore;

/// State shared by every request
///
/// Holds no favorites data; the store is the only source of truth.
pub struct AppState {
    /// Set store holding favorites
    pub store: Arc<dyn FavoritesStore>,
    /// Configuration resolved at start-up
    pub config: Config,
}

impl AppState {
    /// Bundle a store and configuration for the router
    pub fn new(store: Arc<dyn FavoritesStore>, config: Config) -> Arc<Self> {
        Arc::new(Self { store, config })
    }
}
