//! In-process set store
//!
//! Holds favorites sets in memory. Used by the test suite and for running the
//! service without Redis. [`MemoryStore::set_unavailable`] makes every call
//! fail as if the server had gone away.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{FavoritesStore, MovieId, StoreError};

/// Set store kept in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    sets: RwLock<HashMap<String, HashSet<MovieId>>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle simulated outage
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl FavoritesStore for MemoryStore {
    async fn members(&self, key: &str) -> Result<Vec<MovieId>, StoreError> {
        self.check_available()?;

        let sets = self.sets.read().await;
        Ok(sets
            .get(key)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn remove(&self, key: &str, id: MovieId) -> Result<u64, StoreError> {
        self.check_available()?;

        let mut sets = self.sets.write().await;
        let Some(set) = sets.get_mut(key) else {
            return Ok(0);
        };

        let removed = set.remove(&id);
        // Redis drops a set once its last member is gone
        if set.is_empty() {
            sets.remove(key);
        }

        Ok(u64::from(removed))
    }

    async fn add(&self, key: &str, id: MovieId) -> Result<u64, StoreError> {
        self.check_available()?;

        let mut sets = self.sets.write().await;
        let added = sets.entry(key.to_string()).or_default().insert(id);

        Ok(u64::from(added))
    }
}
