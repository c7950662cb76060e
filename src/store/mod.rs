//! Favorites set store
//!
//! The service owns no state of its own. Every favorites set lives in an
//! external set store keyed by user id; handlers only talk to it through
//! [`FavoritesStore`].

pub mod memory;
pub mod redis_store;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Movie identifier stored in a favorites set
pub type MovieId = i64;

/// Errors raised by a set store
///
/// Store calls are never retried; callers get the first failure.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached (refused, dropped, timed out)
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store answered but the command failed or the reply was unusable
    #[error("Store command failed: {0}")]
    Command(String),
}

/// Set operations the favorites handlers rely on
///
/// Each call is treated as atomic; no locking spans multiple calls.
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    /// All members of the set stored at `key`, in store order
    async fn members(&self, key: &str) -> Result<Vec<MovieId>, StoreError>;

    /// Remove `id` from the set, returning the number of removed members
    async fn remove(&self, key: &str, id: MovieId) -> Result<u64, StoreError>;

    /// Add `id` to the set, returning the number of newly added members
    async fn add(&self, key: &str, id: MovieId) -> Result<u64, StoreError>;
}
