//! SessionManager - core business logic for session operations.
//!
//! Owns session identity, JSON serialization, the per-user secondary
//! index, TTL refresh, and capacity eviction, on top of the
//! [`KeyValueStore`] port. Record write, index maintenance, and TTL
//! refresh are separate store calls executed in a fixed order with no
//! transaction; the documented partial-failure outcomes are:
//!
//! - a create that writes the record but fails before indexing leaves an
//!   orphaned record reachable only by direct lookup
//! - concurrent creates by one user can both pass the capacity check,
//!   overshooting until the next create corrects it
//! - an index TTL refresh can race a delete, briefly diverging the index
//!   TTL from an individual session's

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::domain::foundation::{SessionId, UserId};
use crate::domain::session::{Message, Session, SessionError, SessionPatch};
use crate::ports::{KeyValueStore, StoreError};

const SESSION_KEY_PREFIX: &str = "session:";
const USER_INDEX_KEY_PREFIX: &str = "user_sessions:";

fn session_key(id: &SessionId) -> String {
    format!("{}{}", SESSION_KEY_PREFIX, id)
}

fn user_index_key(user_id: &str) -> String {
    format!("{}{}", USER_INDEX_KEY_PREFIX, user_id)
}

/// Parses a caller-supplied session id.
///
/// Blank ids short-circuit without touching the store, and since the
/// manager only ever issues UUIDs, an unparsable id cannot name an
/// existing record and is treated the same way.
fn parse_session_id(raw: &str) -> Option<SessionId> {
    if raw.trim().is_empty() {
        return None;
    }
    raw.parse().ok()
}

/// Manages session lifecycle and operations.
///
/// Create, read, update, delete plus heartbeat, message append, listing,
/// and counting, with TTL management and oldest-first capacity eviction.
/// Holds no state beyond the injected store handle and configuration, so
/// it is cheap to clone and safe to share across request tasks.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    config: SessionConfig,
}

impl SessionManager {
    /// Creates a manager over a ready-to-use store handle.
    ///
    /// Store lifecycle (connect, health-check, close) belongs to the
    /// surrounding service.
    pub fn new(store: Arc<dyn KeyValueStore>, config: SessionConfig) -> Self {
        Self { store, config }
    }

    /// Create a new session owned by `user_id`.
    ///
    /// The identifier is freshly generated; all three timestamps are set
    /// to now, status starts `active`, context and messages start empty.
    /// The record is persisted with the configured TTL, the user index is
    /// updated and its TTL refreshed, then capacity enforcement runs
    /// best-effort.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `user_id` is blank (no store access occurs)
    /// - `StoreUnavailable` if persisting the record or index fails
    pub async fn create(
        &self,
        user_id: &str,
        client_id: Option<String>,
        metadata: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<Session, SessionError> {
        let owner = UserId::new(user_id)
            .map_err(|_| SessionError::invalid_argument("user_id", "user_id is required"))?;

        let session = Session::new(owner, client_id, metadata.unwrap_or_default());

        self.save_session(&session).await?;
        self.add_to_user_index(session.user_id().as_str(), session.session_id())
            .await?;

        // Eviction is best-effort cleanup, never a precondition of the
        // create succeeding.
        if let Err(e) = self.enforce_session_limit(session.user_id().as_str()).await {
            warn!(
                user_id = %session.user_id(),
                error = %e,
                "Capacity enforcement failed after create"
            );
        }

        info!(
            session_id = %session.session_id(),
            user_id = %session.user_id(),
            "Created session"
        );
        Ok(session)
    }

    /// Get a session by id.
    ///
    /// Returns `None` for a blank id (without querying the store), a
    /// missing or expired record, a corrupt payload, or a store failure.
    /// Reads are expiration-neutral: no TTL refresh, no activity touch.
    pub async fn get(&self, session_id: &str) -> Option<Session> {
        match self.fetch(session_id).await {
            Ok(found) => found,
            Err(e) => {
                warn!(session_id, error = %e, "Failed to fetch session, treating as absent");
                None
            }
        }
    }

    /// Apply a partial update to a session.
    ///
    /// Returns `Ok(None)` if the session does not exist. On success the
    /// record is persisted with the TTL reset to the full configured
    /// duration (refresh-on-write).
    ///
    /// # Errors
    ///
    /// - `StoreUnavailable` if the read or write round-trip fails
    pub async fn update(
        &self,
        session_id: &str,
        patch: SessionPatch,
    ) -> Result<Option<Session>, SessionError> {
        let Some(mut session) = self.fetch(session_id).await? else {
            return Ok(None);
        };

        session.apply_patch(patch);
        self.save_session(&session).await?;

        debug!(session_id = %session.session_id(), "Updated session");
        Ok(Some(session))
    }

    /// Record a liveness signal for a session.
    ///
    /// Sets `last_activity_at` and `updated_at` to the same instant and
    /// persists with the TTL reset. This is the sole signal separating a
    /// session still in use from an abandoned one.
    ///
    /// # Errors
    ///
    /// - `StoreUnavailable` if the read or write round-trip fails
    pub async fn heartbeat(&self, session_id: &str) -> Result<Option<Session>, SessionError> {
        let Some(mut session) = self.fetch(session_id).await? else {
            return Ok(None);
        };

        session.record_heartbeat();
        self.save_session(&session).await?;

        debug!(session_id = %session.session_id(), "Heartbeat updated");
        Ok(Some(session))
    }

    /// Append a message to a session's conversation history.
    ///
    /// Appending counts as activity, so both `updated_at` and
    /// `last_activity_at` are refreshed and the TTL resets.
    ///
    /// # Errors
    ///
    /// - `StoreUnavailable` if the read or write round-trip fails
    pub async fn append_message(
        &self,
        session_id: &str,
        role: impl Into<String>,
        content: impl Into<String>,
        metadata: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<Option<Session>, SessionError> {
        let Some(mut session) = self.fetch(session_id).await? else {
            return Ok(None);
        };

        let message = Message::new(role, content).with_metadata(metadata.unwrap_or_default());
        session.append_message(message);
        self.save_session(&session).await?;

        debug!(
            session_id = %session.session_id(),
            message_count = session.message_count(),
            "Appended message"
        );
        Ok(Some(session))
    }

    /// Delete a session.
    ///
    /// Fetches the record to learn its owner, removes the id from the
    /// owner's index, then deletes the record. Returns true only if the
    /// record deletion actually removed a key, so deleting twice yields
    /// false the second time. Store failures degrade to false.
    pub async fn delete(&self, session_id: &str) -> bool {
        let Some(session) = self.get(session_id).await else {
            return false;
        };

        let index_key = user_index_key(session.user_id().as_str());
        if let Err(e) = self
            .store
            .set_remove(&index_key, &session.session_id().to_string())
            .await
        {
            // Leave both index entry and record in place; the caller can
            // retry, and expiry cleans up eventually.
            warn!(session_id, error = %e, "Failed to remove session from user index");
            return false;
        }

        match self.store.delete(&session_key(session.session_id())).await {
            Ok(removed) => {
                if removed > 0 {
                    info!(session_id = %session.session_id(), "Deleted session");
                }
                removed > 0
            }
            Err(e) => {
                warn!(session_id, error = %e, "Failed to delete session record");
                false
            }
        }
    }

    /// List a user's sessions, most recently active first.
    ///
    /// Materializes the user's live sessions (index entries whose record
    /// has expired or is corrupt are silently dropped), sorts by
    /// `last_activity_at` descending, and slices `[offset, offset+limit)`.
    /// Store failures degrade to an empty result.
    pub async fn list(&self, user_id: &str, limit: usize, offset: usize) -> Vec<Session> {
        let mut sessions = self.fetch_all_for_user(user_id).await;
        sessions.sort_by(|a, b| b.last_activity_at().cmp(a.last_activity_at()));
        sessions.into_iter().skip(offset).take(limit).collect()
    }

    /// Count a user's sessions by index cardinality.
    ///
    /// May transiently exceed the number of listable sessions: expired
    /// records stay in the index until an explicit delete prunes them.
    /// Store failures degrade to 0.
    pub async fn count(&self, user_id: &str) -> u64 {
        match self
            .store
            .set_cardinality(&user_index_key(user_id))
            .await
        {
            Ok(count) => count,
            Err(e) => {
                warn!(user_id, error = %e, "Failed to count sessions");
                0
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Reads and decodes a session record.
    ///
    /// `Ok(None)` covers blank/unparsable ids, absent records, and corrupt
    /// payloads (corruption is never distinguished from absence). Store
    /// failures surface as `Err` so each public operation can choose its
    /// own degradation.
    async fn fetch(&self, session_id: &str) -> Result<Option<Session>, StoreError> {
        let Some(id) = parse_session_id(session_id) else {
            return Ok(None);
        };

        let Some(payload) = self.store.get(&session_key(&id)).await? else {
            return Ok(None);
        };

        match serde_json::from_slice::<Session>(&payload) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(session_id = %id, error = %e, "Discarding corrupt session record");
                Ok(None)
            }
        }
    }

    /// Persists the full record with the TTL reset.
    async fn save_session(&self, session: &Session) -> Result<(), StoreError> {
        let payload = serde_json::to_vec(session)
            .map_err(|e| StoreError::Unavailable(format!("failed to encode session record: {e}")))?;
        self.store
            .set_with_expiry(&session_key(session.session_id()), payload, self.config.ttl())
            .await
    }

    /// Adds a session to the user's index and refreshes the index TTL, so
    /// the index neither outlives nor prematurely precedes its sessions
    /// under normal operation.
    async fn add_to_user_index(
        &self,
        user_id: &str,
        session_id: &SessionId,
    ) -> Result<(), StoreError> {
        let index_key = user_index_key(user_id);
        self.store
            .set_add(&index_key, &session_id.to_string())
            .await?;
        self.store.set_expire(&index_key, self.config.ttl()).await
    }

    /// Fetches every live session in the user's index, unsorted.
    async fn fetch_all_for_user(&self, user_id: &str) -> Vec<Session> {
        let ids = match self.store.set_members(&user_index_key(user_id)).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(user_id, error = %e, "Failed to read user session index");
                return Vec::new();
            }
        };

        let mut sessions = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get(&id).await {
                Some(session) => sessions.push(session),
                None => {
                    debug!(session_id = %id, user_id, "Dropping index entry with no live record")
                }
            }
        }
        sessions
    }

    /// Deletes the user's oldest sessions when the index exceeds the
    /// configured maximum.
    ///
    /// Oldest-by-`last_activity_at` go first, each through the normal
    /// delete path so record and index are both cleaned. Not atomic with
    /// concurrent creates by the same user.
    async fn enforce_session_limit(&self, user_id: &str) -> Result<(), StoreError> {
        let count = self
            .store
            .set_cardinality(&user_index_key(user_id))
            .await?;
        if count <= self.config.max_sessions_per_user {
            return Ok(());
        }

        let mut sessions = self.fetch_all_for_user(user_id).await;
        sessions.sort_by(|a, b| a.last_activity_at().cmp(b.last_activity_at()));

        let excess = (count - self.config.max_sessions_per_user) as usize;
        for session in sessions.iter().take(excess) {
            let session_id = session.session_id().to_string();
            if self.delete(&session_id).await {
                info!(
                    session_id = %session_id,
                    user_id,
                    "Evicted session over per-user capacity"
                );
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
