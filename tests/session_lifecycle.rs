//! Integration tests for the session lifecycle.
//!
//! Exercises the session manager end-to-end over the in-memory store:
//! creation, retrieval, update merging, archive/restore, deletion,
//! capacity eviction, and TTL expiry, without external dependencies.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Map};

use session_service::adapters::InMemoryStore;
use session_service::application::SessionManager;
use session_service::config::SessionConfig;
use session_service::domain::session::{SessionPatch, SessionStatus};

fn manager_with(config: SessionConfig) -> SessionManager {
    SessionManager::new(Arc::new(InMemoryStore::new()), config)
}

fn manager() -> SessionManager {
    manager_with(SessionConfig {
        ttl_secs: 3600,
        max_sessions_per_user: 5,
        ..Default::default()
    })
}

#[tokio::test]
async fn full_session_lifecycle() {
    let manager = manager();

    // Create: active, no messages.
    let created = manager.create("u1", None, None).await.unwrap();
    let id = created.session_id().to_string();

    let fetched = manager.get(&id).await.unwrap();
    assert_eq!(fetched.status(), SessionStatus::Active);
    assert!(fetched.messages().is_empty());

    // Archive via update.
    manager
        .update(&id, SessionPatch::new().with_status(SessionStatus::Archived))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        manager.get(&id).await.unwrap().status(),
        SessionStatus::Archived
    );

    // Delete, then everything is gone.
    assert!(manager.delete(&id).await);
    assert!(manager.get(&id).await.is_none());
    assert_eq!(manager.count("u1").await, 0);
}

#[tokio::test]
async fn archive_and_restore_roundtrip() {
    let manager = manager();
    let created = manager.create("u1", None, None).await.unwrap();
    let id = created.session_id().to_string();

    manager
        .update(&id, SessionPatch::new().with_status(SessionStatus::Archived))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        manager.get(&id).await.unwrap().status(),
        SessionStatus::Archived
    );

    manager
        .update(&id, SessionPatch::new().with_status(SessionStatus::Active))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        manager.get(&id).await.unwrap().status(),
        SessionStatus::Active
    );
}

#[tokio::test]
async fn update_merges_context_and_metadata_across_calls() {
    let manager = manager();

    let mut initial_metadata = Map::new();
    initial_metadata.insert("session_type".to_string(), json!("troubleshooting"));
    let created = manager
        .create("u1", None, Some(initial_metadata))
        .await
        .unwrap();
    let id = created.session_id().to_string();

    let mut context = Map::new();
    context.insert("k1".to_string(), json!("v1"));
    manager
        .update(&id, SessionPatch::new().with_context(context))
        .await
        .unwrap()
        .unwrap();

    let mut more_context = Map::new();
    more_context.insert("k2".to_string(), json!("v2"));
    let mut more_metadata = Map::new();
    more_metadata.insert("escalated".to_string(), json!(true));
    let updated = manager
        .update(
            &id,
            SessionPatch::new()
                .with_context(more_context)
                .with_metadata(more_metadata),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.context()["k1"], json!("v1"));
    assert_eq!(updated.context()["k2"], json!("v2"));
    assert_eq!(updated.metadata()["session_type"], json!("troubleshooting"));
    assert_eq!(updated.metadata()["escalated"], json!(true));
}

#[tokio::test]
async fn conversation_survives_lifecycle_operations() {
    let manager = manager();
    let created = manager.create("u1", None, None).await.unwrap();
    let id = created.session_id().to_string();

    manager
        .append_message(&id, "user", "the API returns 502", None)
        .await
        .unwrap()
        .unwrap();
    manager
        .append_message(&id, "assistant", "is the upstream healthy?", None)
        .await
        .unwrap()
        .unwrap();

    // Unrelated mutations leave the conversation untouched.
    manager
        .update(&id, SessionPatch::new().with_title("502 investigation"))
        .await
        .unwrap()
        .unwrap();
    manager.heartbeat(&id).await.unwrap().unwrap();

    let fetched = manager.get(&id).await.unwrap();
    assert_eq!(fetched.message_count(), 2);
    assert_eq!(fetched.messages()[0].content(), "the API returns 502");
    assert_eq!(fetched.messages()[1].role(), "assistant");
    assert_eq!(fetched.title(), Some("502 investigation"));
}

#[tokio::test]
async fn capacity_eviction_keeps_most_recently_active() {
    let manager = manager_with(SessionConfig {
        ttl_secs: 3600,
        max_sessions_per_user: 2,
        ..Default::default()
    });

    let first = manager.create("u1", None, None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = manager.create("u1", None, None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    let third = manager.create("u1", None, None).await.unwrap();

    // Limit is 2: the oldest-by-activity session was evicted.
    assert_eq!(manager.count("u1").await, 2);
    assert!(manager.get(&first.session_id().to_string()).await.is_none());
    assert!(manager
        .get(&second.session_id().to_string())
        .await
        .is_some());
    assert!(manager.get(&third.session_id().to_string()).await.is_some());

    let listed = manager.list("u1", 50, 0).await;
    assert_eq!(listed.len(), 2);
    assert!(listed
        .iter()
        .all(|s| s.session_id() != first.session_id()));
}

#[tokio::test]
async fn sessions_are_isolated_between_users() {
    let manager = manager();

    let mine = manager.create("u1", None, None).await.unwrap();
    manager.create("u2", None, None).await.unwrap();

    let my_sessions = manager.list("u1", 50, 0).await;
    assert_eq!(my_sessions.len(), 1);
    assert_eq!(my_sessions[0].session_id(), mine.session_id());
    assert_eq!(manager.count("u2").await, 1);
}

#[tokio::test]
async fn expired_sessions_vanish_from_get_and_count() {
    let manager = manager_with(SessionConfig {
        ttl_secs: 1,
        max_sessions_per_user: 5,
        ..Default::default()
    });

    let created = manager.create("u1", None, None).await.unwrap();
    let id = created.session_id().to_string();
    assert!(manager.get(&id).await.is_some());

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert!(manager.get(&id).await.is_none());
    assert!(manager.list("u1", 50, 0).await.is_empty());
    assert_eq!(manager.count("u1").await, 0);
}

#[tokio::test]
async fn count_lags_list_when_record_expires_before_index() {
    let manager = manager_with(SessionConfig {
        ttl_secs: 1,
        max_sessions_per_user: 5,
        ..Default::default()
    });

    // First record expires 1s after creation; the second create refreshes
    // the index TTL, so the index outlives the first record.
    let first = manager.create("u1", None, None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;
    let second = manager.create("u1", None, None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert!(manager.get(&first.session_id().to_string()).await.is_none());
    assert!(manager
        .get(&second.session_id().to_string())
        .await
        .is_some());

    // List drops the dead entry; count still reports the stale index.
    let listed = manager.list("u1", 50, 0).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].session_id(), second.session_id());
    assert_eq!(manager.count("u1").await, 2);
}

#[tokio::test]
async fn heartbeat_resets_record_ttl() {
    let manager = manager_with(SessionConfig {
        ttl_secs: 1,
        max_sessions_per_user: 5,
        ..Default::default()
    });

    let created = manager.create("u1", None, None).await.unwrap();
    let id = created.session_id().to_string();

    // Keep the session alive past its original deadline.
    tokio::time::sleep(Duration::from_millis(600)).await;
    manager.heartbeat(&id).await.unwrap().unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert!(manager.get(&id).await.is_some());
}
