//! HTTP routes for session endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    add_session_message, archive_session, create_session, delete_session, get_session,
    get_session_messages, get_session_stats, list_sessions, restore_session, search_sessions,
    session_heartbeat, update_session, SessionState,
};

/// Creates the session router with all endpoints.
pub fn session_routes(state: SessionState) -> Router {
    Router::new()
        .route("/", post(create_session).get(list_sessions))
        .route("/search", post(search_sessions))
        .route(
            "/:id",
            get(get_session).put(update_session).delete(delete_session),
        )
        .route("/:id/heartbeat", post(session_heartbeat))
        .route("/:id/archive", post(archive_session))
        .route("/:id/restore", post(restore_session))
        .route(
            "/:id/messages",
            post(add_session_message).get(get_session_messages),
        )
        .route("/:id/stats", get(get_session_stats))
        .with_state(state)
}
