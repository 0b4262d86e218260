//! Session aggregate entity.
//!
//! A session is the per-user unit of troubleshooting state: identity,
//! lifecycle timestamps, status, free-form context/metadata maps, and an
//! ordered conversation history. The record is persisted whole as JSON;
//! field names here are the wire format.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::{SessionId, Timestamp, UserId};

use super::{Message, SessionPatch, SessionStatus};

/// Session aggregate - a single troubleshooting workspace.
///
/// # Invariants
///
/// - `session_id` is globally unique and immutable
/// - `user_id` is immutable after creation
/// - `created_at` is set once; `updated_at` moves on every mutation;
///   `last_activity_at` moves on activity signals (heartbeat, message)
/// - `messages` is append-only, ordered by arrival
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier for this session.
    session_id: SessionId,

    /// User who owns this session.
    user_id: UserId,

    /// Optional human-readable title.
    #[serde(default)]
    title: Option<String>,

    /// Optional client/device identifier for multi-device support.
    #[serde(default)]
    client_id: Option<String>,

    /// When the session was created.
    created_at: Timestamp,

    /// When the session was last mutated.
    updated_at: Timestamp,

    /// When activity was last signalled (heartbeat).
    last_activity_at: Timestamp,

    /// Current lifecycle status.
    #[serde(default)]
    status: SessionStatus,

    /// Troubleshooting context, shallow-merged on update.
    #[serde(default)]
    context: Map<String, Value>,

    /// Conversation history, append-only.
    #[serde(default)]
    messages: Vec<Message>,

    /// Additional session metadata, shallow-merged on update.
    #[serde(default)]
    metadata: Map<String, Value>,
}

impl Session {
    /// Creates a new active session owned by `user_id`.
    ///
    /// All three timestamps are set to the same instant; context and
    /// messages start empty.
    pub fn new(user_id: UserId, client_id: Option<String>, metadata: Map<String, Value>) -> Self {
        let now = Timestamp::now();
        Self {
            session_id: SessionId::new(),
            user_id,
            title: None,
            client_id,
            created_at: now,
            updated_at: now,
            last_activity_at: now,
            status: SessionStatus::Active,
            context: Map::new(),
            messages: Vec::new(),
            metadata,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the session ID.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Returns the owner's user ID.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the session title.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the client/device identifier.
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// Returns when the session was created.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns when the session was last mutated.
    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// Returns when activity was last signalled.
    pub fn last_activity_at(&self) -> &Timestamp {
        &self.last_activity_at
    }

    /// Returns the current status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Returns the troubleshooting context.
    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    /// Returns the conversation history.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of messages.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Returns the session metadata.
    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// Checks if the given user owns this session.
    pub fn is_owner(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Applies a partial update and refreshes `updated_at`.
    ///
    /// `title` and `status` are replaced whole-value when present.
    /// `context` and `metadata` are shallow-merged: supplied keys
    /// overwrite, other keys are preserved, nothing is deleted.
    pub fn apply_patch(&mut self, patch: SessionPatch) {
        if let Some(title) = patch.title {
            self.title = Some(title);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(context) = patch.context {
            self.context.extend(context);
        }
        if let Some(metadata) = patch.metadata {
            self.metadata.extend(metadata);
        }
        self.updated_at = Timestamp::now();
    }

    /// Records a liveness signal.
    ///
    /// Sets `last_activity_at` and `updated_at` to the same instant,
    /// leaving every other field untouched.
    pub fn record_heartbeat(&mut self) {
        let now = Timestamp::now();
        self.last_activity_at = now;
        self.updated_at = now;
    }

    /// Appends a message to the conversation history.
    ///
    /// Appending counts as activity: both `updated_at` and
    /// `last_activity_at` are refreshed.
    pub fn append_message(&mut self, message: Message) {
        self.messages.push(message);
        let now = Timestamp::now();
        self.updated_at = now;
        self.last_activity_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Duration;

    fn test_user_id() -> UserId {
        UserId::new("user-123").unwrap()
    }

    fn test_session() -> Session {
        Session::new(test_user_id(), Some("client-abc".to_string()), Map::new())
    }

    // Construction tests

    #[test]
    fn new_session_is_active() {
        let session = test_session();
        assert_eq!(session.status(), SessionStatus::Active);
    }

    #[test]
    fn new_session_has_empty_context_and_messages() {
        let session = test_session();
        assert!(session.context().is_empty());
        assert!(session.messages().is_empty());
        assert_eq!(session.message_count(), 0);
    }

    #[test]
    fn new_session_timestamps_coincide() {
        let session = test_session();
        assert_eq!(session.created_at(), session.updated_at());
        assert_eq!(session.created_at(), session.last_activity_at());
    }

    #[test]
    fn new_session_keeps_supplied_metadata() {
        let mut metadata = Map::new();
        metadata.insert("session_type".to_string(), json!("troubleshooting"));
        let session = Session::new(test_user_id(), None, metadata);
        assert_eq!(session.metadata()["session_type"], json!("troubleshooting"));
    }

    // Patch tests

    #[test]
    fn apply_patch_replaces_title_and_status() {
        let mut session = test_session();
        session.apply_patch(
            SessionPatch::new()
                .with_title("Network outage")
                .with_status(SessionStatus::InProgress),
        );
        assert_eq!(session.title(), Some("Network outage"));
        assert_eq!(session.status(), SessionStatus::InProgress);
    }

    #[test]
    fn apply_patch_merges_context_without_replacing() {
        let mut session = test_session();

        let mut first = Map::new();
        first.insert("k1".to_string(), json!("v1"));
        session.apply_patch(SessionPatch::new().with_context(first));

        let mut second = Map::new();
        second.insert("k2".to_string(), json!("v2"));
        session.apply_patch(SessionPatch::new().with_context(second));

        assert_eq!(session.context()["k1"], json!("v1"));
        assert_eq!(session.context()["k2"], json!("v2"));
    }

    #[test]
    fn apply_patch_overwrites_colliding_context_keys() {
        let mut session = test_session();

        let mut first = Map::new();
        first.insert("k1".to_string(), json!("old"));
        session.apply_patch(SessionPatch::new().with_context(first));

        let mut second = Map::new();
        second.insert("k1".to_string(), json!("new"));
        session.apply_patch(SessionPatch::new().with_context(second));

        assert_eq!(session.context()["k1"], json!("new"));
    }

    #[test]
    fn apply_patch_advances_updated_at_only() {
        let mut session = test_session();
        let created = *session.created_at();
        let activity = *session.last_activity_at();

        sleep(Duration::from_millis(10));
        session.apply_patch(SessionPatch::new().with_title("Renamed"));

        assert!(session.updated_at().is_after(&created));
        assert_eq!(session.created_at(), &created);
        assert_eq!(session.last_activity_at(), &activity);
    }

    // Heartbeat tests

    #[test]
    fn heartbeat_advances_activity_and_update_together() {
        let mut session = test_session();
        let before = *session.last_activity_at();

        sleep(Duration::from_millis(10));
        session.record_heartbeat();

        assert!(session.last_activity_at().is_after(&before));
        assert_eq!(session.last_activity_at(), session.updated_at());
    }

    #[test]
    fn heartbeat_leaves_other_fields_untouched() {
        let mut session = test_session();
        let created = *session.created_at();

        session.record_heartbeat();

        assert_eq!(session.created_at(), &created);
        assert_eq!(session.user_id(), &test_user_id());
        assert!(session.messages().is_empty());
    }

    // Message tests

    #[test]
    fn append_message_preserves_order() {
        let mut session = test_session();
        session.append_message(Message::new("user", "first"));
        session.append_message(Message::new("assistant", "second"));

        assert_eq!(session.message_count(), 2);
        assert_eq!(session.messages()[0].content(), "first");
        assert_eq!(session.messages()[1].content(), "second");
    }

    #[test]
    fn append_message_counts_as_activity() {
        let mut session = test_session();
        let before = *session.last_activity_at();

        sleep(Duration::from_millis(10));
        session.append_message(Message::new("user", "anything"));

        assert!(session.last_activity_at().is_after(&before));
    }

    // Ownership tests

    #[test]
    fn owner_matches() {
        let session = test_session();
        assert!(session.is_owner(&test_user_id()));
    }

    #[test]
    fn non_owner_does_not_match() {
        let session = test_session();
        let other = UserId::new("someone-else").unwrap();
        assert!(!session.is_owner(&other));
    }

    // Serialization tests

    #[test]
    fn serializes_with_wire_field_names() {
        let session = test_session();
        let value = serde_json::to_value(&session).unwrap();

        for field in [
            "session_id",
            "user_id",
            "title",
            "client_id",
            "created_at",
            "updated_at",
            "last_activity_at",
            "status",
            "context",
            "messages",
            "metadata",
        ] {
            assert!(value.get(field).is_some(), "missing field {}", field);
        }
        assert_eq!(value["status"], json!("active"));
    }

    #[test]
    fn roundtrips_through_json() {
        let mut metadata = Map::new();
        metadata.insert("nested".to_string(), json!({"a": [1, 2, 3]}));

        let mut session = Session::new(test_user_id(), Some("cli".to_string()), metadata);
        session.append_message(
            Message::new("user", "it broke").with_metadata({
                let mut m = Map::new();
                m.insert("severity".to_string(), json!("high"));
                m
            }),
        );
        session.apply_patch(SessionPatch::new().with_title("Broken thing"));

        let json = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn deserializes_record_with_missing_optional_fields() {
        let json = r#"{
            "session_id": "550e8400-e29b-41d4-a716-446655440000",
            "user_id": "user-123",
            "created_at": "2024-01-15T10:30:00Z",
            "updated_at": "2024-01-15T10:30:00+00:00",
            "last_activity_at": "2024-01-15T10:30:00Z"
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.status(), SessionStatus::Active);
        assert!(session.title().is_none());
        assert!(session.messages().is_empty());
    }
}
