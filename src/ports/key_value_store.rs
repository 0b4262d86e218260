//! Key-value store port.
//!
//! Defines the contract the session manager needs from its backing store:
//! byte payloads with expiration plus a string-set type for the per-user
//! index. Implementations own connection handling and per-operation
//! timeouts; the manager never retries internally.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by a key-value store implementation.
///
/// All variants mean the same thing to callers: the store did not complete
/// the operation. Degradation policy (return a safe default vs. propagate)
/// is decided per operation by the session manager, not here.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Store operation failed: {0}")]
    Unavailable(String),

    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Port for the expiring key-value store backing session persistence.
///
/// Implementations must ensure:
/// - Each call is a single bounded round-trip (short fixed timeout)
/// - No internal retries; failures surface as [`StoreError`]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the payload stored under `key`, or `None` if absent/expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Store `value` under `key` with the given time-to-live.
    async fn set_with_expiry(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Delete `key`, returning the number of keys actually removed.
    async fn delete(&self, key: &str) -> Result<u64, StoreError>;

    /// Add `member` to the set stored under `key`, creating it if needed.
    async fn set_add(&self, key: &str, member: &str) -> Result<(), StoreError>;

    /// Remove `member` from the set stored under `key`.
    async fn set_remove(&self, key: &str, member: &str) -> Result<(), StoreError>;

    /// Return all members of the set stored under `key`.
    ///
    /// Iteration order is unspecified.
    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError>;

    /// Return the cardinality of the set stored under `key` (0 if absent).
    async fn set_cardinality(&self, key: &str) -> Result<u64, StoreError>;

    /// Refresh the time-to-live of `key`.
    async fn set_expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError>;
}
