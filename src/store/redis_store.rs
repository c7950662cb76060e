//! # Redis
//!
//! Favorites are Redis sets: one key per user id, one member per movie id.
//!
//! - `SMEMBERS` to list, `SREM` then `SADD` to toggle
//! - One [`ConnectionManager`] shared by every request, multiplexed and
//!   reconnecting on its own
//! - The connection is opened on first use so the service starts even when
//!   Redis is down; a failed attempt is retried by the next request
use std::time::Duration;

use async_trait::async_trait;
use redis::{
    aio::{ConnectionManager, ConnectionManagerConfig},
    AsyncCommands, Client, RedisError,
};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::{FavoritesStore, MovieId, StoreError};
use crate::config::StoreConfig;

const CONNECTION_TIMEOUT: Duration = Duration::from_millis(500);
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Set store backed by a Redis server
pub struct RedisStore {
    client: Client,
    connection: OnceCell<ConnectionManager>,
}

impl RedisStore {
    /// Create a store for the configured server. Only the URL is checked here.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = Client::open(config.url()).map_err(StoreError::from)?;

        Ok(Self {
            client,
            connection: OnceCell::new(),
        })
    }

    /// Open the shared connection if it is not open yet.
    pub async fn connect(&self) -> Result<(), StoreError> {
        self.connection().await.map(|_| ())
    }

    async fn connection(&self) -> Result<ConnectionManager, StoreError> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                let config = ConnectionManagerConfig::new()
                    .set_number_of_retries(1)
                    .set_connection_timeout(CONNECTION_TIMEOUT)
                    .set_response_timeout(RESPONSE_TIMEOUT);

                let manager = self
                    .client
                    .get_connection_manager_with_config(config)
                    .await?;
                info!("Connected to Redis");

                Ok::<_, RedisError>(manager)
            })
            .await?;

        Ok(manager.clone())
    }
}

#[async_trait]
impl FavoritesStore for RedisStore {
    async fn members(&self, key: &str) -> Result<Vec<MovieId>, StoreError> {
        let mut connection = self.connection().await?;
        let members: Vec<MovieId> = connection.smembers(key).await?;

        debug!(key, count = members.len(), "SMEMBERS");
        Ok(members)
    }

    async fn remove(&self, key: &str, id: MovieId) -> Result<u64, StoreError> {
        let mut connection = self.connection().await?;
        let removed: u64 = connection.srem(key, id).await?;

        debug!(key, id, removed, "SREM");
        Ok(removed)
    }

    async fn add(&self, key: &str, id: MovieId) -> Result<u64, StoreError> {
        let mut connection = self.connection().await?;
        let added: u64 = connection.sadd(key, id).await?;

        debug!(key, id, added, "SADD");
        Ok(added)
    }
}

impl From<RedisError> for StoreError {
    fn from(err: RedisError) -> Self {
        if err.is_io_error()
            || err.is_timeout()
            || err.is_connection_dropped()
            || err.is_connection_refusal()
        {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Command(err.to_string())
        }
    }
}
