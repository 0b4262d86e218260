//! Redis-backed key-value store implementation for production deployments.
//!
//! Wraps a multiplexed async connection; every command is bounded by the
//! configured response timeout so no session operation can block a request
//! task indefinitely. Failures map to [`StoreError`] without retrying -
//! retry policy belongs to the caller.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::config::RedisConfig;
use crate::ports::{KeyValueStore, StoreError};

/// Redis-backed key-value store.
#[derive(Clone)]
pub struct RedisKeyValueStore {
    conn: MultiplexedConnection,
    response_timeout: Duration,
}

impl RedisKeyValueStore {
    /// Create a store over an already-established connection.
    pub fn new(conn: MultiplexedConnection, response_timeout: Duration) -> Self {
        Self {
            conn,
            response_timeout,
        }
    }

    /// Connect to Redis using the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the URL is invalid or the connection cannot
    /// be established within the configured connect timeout.
    pub async fn connect(config: &RedisConfig) -> Result<Self, StoreError> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e: redis::RedisError| StoreError::Unavailable(e.to_string()))?;

        let conn = tokio::time::timeout(
            config.connect_timeout(),
            client.get_multiplexed_tokio_connection(),
        )
        .await
        .map_err(|_| StoreError::Timeout(config.connect_timeout()))?
        .map_err(|e: redis::RedisError| StoreError::Unavailable(e.to_string()))?;

        tracing::info!("Redis connection established");
        Ok(Self::new(conn, config.response_timeout()))
    }

    /// Run a single redis command bounded by the response timeout.
    async fn bounded<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.response_timeout, op).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(StoreError::Unavailable(e.to_string())),
            Err(_) => Err(StoreError::Timeout(self.response_timeout)),
        }
    }
}

#[async_trait]
impl KeyValueStore for RedisKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.conn.clone();
        self.bounded(conn.get(key)).await
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        self.bounded(conn.set_ex(key, value, ttl.as_secs()))
            .await
    }

    async fn delete(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        self.bounded(conn.del(key)).await
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        self.bounded(conn.sadd(key, member)).await
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        self.bounded(conn.srem(key, member)).await
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn.clone();
        self.bounded(conn.smembers(key)).await
    }

    async fn set_cardinality(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        self.bounded(conn.scard(key)).await
    }

    async fn set_expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        self.bounded(conn.expire(key, ttl.as_secs() as i64)).await
    }
}

impl std::fmt::Debug for RedisKeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisKeyValueStore")
            .field("response_timeout", &self.response_timeout)
            .finish_non_exhaustive()
    }
}
