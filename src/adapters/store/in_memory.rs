//! In-memory key-value store implementation for testing and development.
//!
//! Honors TTLs against the process clock so expiry behavior can be
//! exercised without a running Redis.
//!
//! # Security Note
//!
//! This adapter is for **testing and local development only**. It uses
//! `.expect()` on lock operations which will panic if locks are poisoned.
//! Production deployments use the Redis adapter.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::ports::{KeyValueStore, StoreError};

struct ValueEntry {
    payload: Vec<u8>,
    expires_at: Option<Instant>,
}

struct SetEntry {
    members: HashSet<String>,
    expires_at: Option<Instant>,
}

fn is_expired(expires_at: Option<Instant>) -> bool {
    expires_at.is_some_and(|deadline| Instant::now() >= deadline)
}

/// In-memory store with TTL support.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned. This is acceptable
/// for test code but this adapter should NOT be used in production.
#[derive(Default)]
pub struct InMemoryStore {
    values: RwLock<HashMap<String, ValueEntry>>,
    sets: RwLock<HashMap<String, SetEntry>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Returns the number of live value keys (for test assertions).
    pub fn value_count(&self) -> usize {
        self.values
            .read()
            .expect("InMemoryStore: values lock poisoned")
            .iter()
            .filter(|(_, entry)| !is_expired(entry.expires_at))
            .count()
    }

    /// Returns the number of live set keys (for test assertions).
    pub fn set_count(&self) -> usize {
        self.sets
            .read()
            .expect("InMemoryStore: sets lock poisoned")
            .iter()
            .filter(|(_, entry)| !is_expired(entry.expires_at))
            .count()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut values = self
            .values
            .write()
            .expect("InMemoryStore: values lock poisoned");
        match values.get(key) {
            Some(entry) if is_expired(entry.expires_at) => {
                values.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.payload.clone())),
            None => Ok(None),
        }
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut values = self
            .values
            .write()
            .expect("InMemoryStore: values lock poisoned");
        values.insert(
            key.to_string(),
            ValueEntry {
                payload: value,
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<u64, StoreError> {
        let mut values = self
            .values
            .write()
            .expect("InMemoryStore: values lock poisoned");
        match values.remove(key) {
            Some(entry) if !is_expired(entry.expires_at) => Ok(1),
            _ => Ok(0),
        }
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut sets = self.sets.write().expect("InMemoryStore: sets lock poisoned");
        let entry = sets.entry(key.to_string()).or_insert_with(|| SetEntry {
            members: HashSet::new(),
            expires_at: None,
        });
        if is_expired(entry.expires_at) {
            entry.members.clear();
            entry.expires_at = None;
        }
        entry.members.insert(member.to_string());
        Ok(())
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut sets = self.sets.write().expect("InMemoryStore: sets lock poisoned");
        if let Some(entry) = sets.get_mut(key) {
            if is_expired(entry.expires_at) {
                sets.remove(key);
            } else {
                entry.members.remove(member);
                if entry.members.is_empty() {
                    sets.remove(key);
                }
            }
        }
        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let mut sets = self.sets.write().expect("InMemoryStore: sets lock poisoned");
        match sets.get(key) {
            Some(entry) if is_expired(entry.expires_at) => {
                sets.remove(key);
                Ok(Vec::new())
            }
            Some(entry) => Ok(entry.members.iter().cloned().collect()),
            None => Ok(Vec::new()),
        }
    }

    async fn set_cardinality(&self, key: &str) -> Result<u64, StoreError> {
        let mut sets = self.sets.write().expect("InMemoryStore: sets lock poisoned");
        match sets.get(key) {
            Some(entry) if is_expired(entry.expires_at) => {
                sets.remove(key);
                Ok(0)
            }
            Some(entry) => Ok(entry.members.len() as u64),
            None => Ok(0),
        }
    }

    async fn set_expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut sets = self.sets.write().expect("InMemoryStore: sets lock poisoned");
        if let Some(entry) = sets.get_mut(key) {
            if is_expired(entry.expires_at) {
                sets.remove(key);
            } else {
                entry.expires_at = Some(Instant::now() + ttl);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_returns_stored_value() {
        let store = InMemoryStore::new();
        store
            .set_with_expiry("k", b"v".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"v".to_vec()));
    }

    #[tokio::test]
    async fn get_returns_none_for_missing_key() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn value_expires_after_ttl() {
        let store = InMemoryStore::new();
        store
            .set_with_expiry("k", b"v".to_vec(), Duration::from_millis(10))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(25)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.value_count(), 0);
    }

    #[tokio::test]
    async fn delete_reports_removed_count() {
        let store = InMemoryStore::new();
        store
            .set_with_expiry("k", b"v".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(store.delete("k").await.unwrap(), 1);
        assert_eq!(store.delete("k").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn set_add_and_members_roundtrip() {
        let store = InMemoryStore::new();
        store.set_add("s", "a").await.unwrap();
        store.set_add("s", "b").await.unwrap();
        store.set_add("s", "a").await.unwrap();

        let mut members = store.set_members("s").await.unwrap();
        members.sort();
        assert_eq!(members, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.set_cardinality("s").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn set_remove_drops_member() {
        let store = InMemoryStore::new();
        store.set_add("s", "a").await.unwrap();
        store.set_add("s", "b").await.unwrap();
        store.set_remove("s", "a").await.unwrap();

        assert_eq!(store.set_cardinality("s").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn set_expires_after_set_expire() {
        let store = InMemoryStore::new();
        store.set_add("s", "a").await.unwrap();
        store
            .set_expire("s", Duration::from_millis(10))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(25)).await;
        assert!(store.set_members("s").await.unwrap().is_empty());
        assert_eq!(store.set_cardinality("s").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn set_expire_refreshes_deadline() {
        let store = InMemoryStore::new();
        store.set_add("s", "a").await.unwrap();
        store
            .set_expire("s", Duration::from_millis(30))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(15)).await;
        store
            .set_expire("s", Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(store.set_cardinality("s").await.unwrap(), 1);
    }
}
