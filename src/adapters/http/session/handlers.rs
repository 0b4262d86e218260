//! HTTP handlers for session endpoints.
//!
//! Thin adapters only: extract identity, enforce ownership, call the
//! session manager, map results to transport responses. No session
//! business logic lives here.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::adapters::http::middleware::UserIdentity;
use crate::application::SessionManager;
use crate::config::SessionConfig;
use crate::domain::session::{Session, SessionError, SessionPatch, SessionStatus};

use super::dto::{
    AddMessageRequest, CreateSessionRequest, ErrorResponse, HeartbeatResponse, ListMessagesQuery,
    ListSessionsQuery, MessageAppendedResponse, MessageResponse, MessagesResponse, SearchResponse,
    SearchSessionsRequest, SessionListResponse, SessionResponse, SessionStatsResponse,
    SessionSummaryResponse, StatusChangeResponse, UpdateSessionRequest,
};

/// Upper bound for the list endpoint's page size.
const MAX_LIST_LIMIT: usize = 100;

/// Upper bound for the messages endpoint's window size.
const MAX_MESSAGES_LIMIT: usize = 500;

/// How many sessions search materializes before filtering.
const SEARCH_SCAN_LIMIT: usize = 1000;

/// Default number of search results returned.
const DEFAULT_SEARCH_LIMIT: usize = 50;

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct SessionState {
    manager: Arc<SessionManager>,
    config: SessionConfig,
}

impl SessionState {
    pub fn new(manager: Arc<SessionManager>, config: SessionConfig) -> Self {
        Self { manager, config }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/v1/sessions - Create a new session
pub async fn create_session(
    State(state): State<SessionState>,
    UserIdentity(user_id): UserIdentity,
    Json(req): Json<CreateSessionRequest>,
) -> Response {
    let timeout_minutes = req
        .timeout_minutes
        .unwrap_or(state.config.default_timeout_minutes);
    if timeout_minutes < state.config.min_timeout_minutes
        || timeout_minutes > state.config.max_timeout_minutes
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(format!(
                "timeout_minutes must be between {} and {}",
                state.config.min_timeout_minutes, state.config.max_timeout_minutes
            ))),
        )
            .into_response();
    }

    let mut metadata = req.metadata.unwrap_or_default();
    metadata.insert(
        "session_type".to_string(),
        json!(req
            .session_type
            .unwrap_or_else(|| "troubleshooting".to_string())),
    );
    metadata.insert("timeout_minutes".to_string(), json!(timeout_minutes));

    match state
        .manager
        .create(&user_id, req.client_id, Some(metadata))
        .await
    {
        Ok(session) => {
            (StatusCode::CREATED, Json(SessionResponse::from(&session))).into_response()
        }
        Err(e) => handle_session_error(e, "create session"),
    }
}

/// GET /api/v1/sessions - List the caller's sessions
pub async fn list_sessions(
    State(state): State<SessionState>,
    UserIdentity(user_id): UserIdentity,
    Query(query): Query<ListSessionsQuery>,
) -> Response {
    if query.limit == 0 || query.limit > MAX_LIST_LIMIT {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(format!(
                "limit must be between 1 and {}",
                MAX_LIST_LIMIT
            ))),
        )
            .into_response();
    }

    let sessions = state.manager.list(&user_id, query.limit, query.offset).await;
    let total = state.manager.count(&user_id).await;

    let response = SessionListResponse {
        sessions: sessions.iter().map(SessionResponse::from).collect(),
        total,
        limit: query.limit,
        offset: query.offset,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /api/v1/sessions/:id - Get session details
pub async fn get_session(
    State(state): State<SessionState>,
    UserIdentity(user_id): UserIdentity,
    Path(session_id): Path<String>,
) -> Response {
    match load_owned(&state, &session_id, &user_id).await {
        Ok(session) => (StatusCode::OK, Json(SessionResponse::from(&session))).into_response(),
        Err(response) => response,
    }
}

/// PUT /api/v1/sessions/:id - Update a session
pub async fn update_session(
    State(state): State<SessionState>,
    UserIdentity(user_id): UserIdentity,
    Path(session_id): Path<String>,
    Json(req): Json<UpdateSessionRequest>,
) -> Response {
    if let Err(response) = load_owned(&state, &session_id, &user_id).await {
        return response;
    }

    let patch = SessionPatch {
        title: req.title,
        status: req.status,
        context: req.context,
        metadata: req.metadata,
    };

    match state.manager.update(&session_id, patch).await {
        Ok(Some(session)) => {
            (StatusCode::OK, Json(SessionResponse::from(&session))).into_response()
        }
        Ok(None) => session_not_found(&session_id),
        Err(e) => handle_session_error(e, "update session"),
    }
}

/// DELETE /api/v1/sessions/:id - Delete a session
pub async fn delete_session(
    State(state): State<SessionState>,
    UserIdentity(user_id): UserIdentity,
    Path(session_id): Path<String>,
) -> Response {
    if let Err(response) = load_owned(&state, &session_id, &user_id).await {
        return response;
    }

    if state.manager.delete(&session_id).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal("Failed to delete session")),
        )
            .into_response()
    }
}

/// POST /api/v1/sessions/:id/heartbeat - Record a liveness signal
pub async fn session_heartbeat(
    State(state): State<SessionState>,
    UserIdentity(user_id): UserIdentity,
    Path(session_id): Path<String>,
) -> Response {
    if let Err(response) = load_owned(&state, &session_id, &user_id).await {
        return response;
    }

    match state.manager.heartbeat(&session_id).await {
        Ok(Some(session)) => {
            (StatusCode::OK, Json(HeartbeatResponse::from_session(&session))).into_response()
        }
        Ok(None) => session_not_found(&session_id),
        Err(e) => handle_session_error(e, "update heartbeat"),
    }
}

/// POST /api/v1/sessions/:id/archive - Archive a session
pub async fn archive_session(
    State(state): State<SessionState>,
    UserIdentity(user_id): UserIdentity,
    Path(session_id): Path<String>,
) -> Response {
    change_status(&state, &session_id, &user_id, SessionStatus::Archived).await
}

/// POST /api/v1/sessions/:id/restore - Restore an archived session
pub async fn restore_session(
    State(state): State<SessionState>,
    UserIdentity(user_id): UserIdentity,
    Path(session_id): Path<String>,
) -> Response {
    change_status(&state, &session_id, &user_id, SessionStatus::Active).await
}

/// POST /api/v1/sessions/search - Filter the caller's sessions
pub async fn search_sessions(
    State(state): State<SessionState>,
    UserIdentity(user_id): UserIdentity,
    Json(req): Json<SearchSessionsRequest>,
) -> Response {
    let sessions = state.manager.list(&user_id, SEARCH_SCAN_LIMIT, 0).await;
    let filtered = apply_search_filters(sessions, &req);

    let total = filtered.len();
    let limit = req.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    let response = SearchResponse {
        sessions: filtered
            .iter()
            .take(limit)
            .map(SessionSummaryResponse::from)
            .collect(),
        total,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// POST /api/v1/sessions/:id/messages - Append a message
pub async fn add_session_message(
    State(state): State<SessionState>,
    UserIdentity(user_id): UserIdentity,
    Path(session_id): Path<String>,
    Json(req): Json<AddMessageRequest>,
) -> Response {
    if let Err(response) = load_owned(&state, &session_id, &user_id).await {
        return response;
    }

    match state
        .manager
        .append_message(&session_id, req.role, req.content, req.metadata)
        .await
    {
        Ok(Some(session)) => {
            // append_message just pushed, so the sequence is non-empty
            let Some(message) = session.messages().last() else {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::internal("Failed to add message")),
                )
                    .into_response();
            };
            let response = MessageAppendedResponse {
                session_id: session.session_id().to_string(),
                message: MessageResponse::from(message),
                total_messages: session.message_count(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(None) => session_not_found(&session_id),
        Err(e) => handle_session_error(e, "add message"),
    }
}

/// GET /api/v1/sessions/:id/messages - Read the trailing message window
pub async fn get_session_messages(
    State(state): State<SessionState>,
    UserIdentity(user_id): UserIdentity,
    Path(session_id): Path<String>,
    Query(query): Query<ListMessagesQuery>,
) -> Response {
    if query.limit == 0 || query.limit > MAX_MESSAGES_LIMIT {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(format!(
                "limit must be between 1 and {}",
                MAX_MESSAGES_LIMIT
            ))),
        )
            .into_response();
    }

    let session = match load_owned(&state, &session_id, &user_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    let total = session.message_count();
    let window = &session.messages()[total.saturating_sub(query.limit)..];
    let response = MessagesResponse {
        session_id: session.session_id().to_string(),
        messages: window.iter().map(MessageResponse::from).collect(),
        total,
        returned: window.len(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /api/v1/sessions/:id/stats - Derived session statistics
pub async fn get_session_stats(
    State(state): State<SessionState>,
    UserIdentity(user_id): UserIdentity,
    Path(session_id): Path<String>,
) -> Response {
    let session = match load_owned(&state, &session_id, &user_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    let duration_seconds = session
        .last_activity_at()
        .duration_since(session.created_at())
        .num_seconds();

    let response = SessionStatsResponse {
        session_id: session.session_id().to_string(),
        message_count: session.message_count(),
        duration_seconds,
        status: session.status(),
        created_at: session.created_at().to_rfc3339(),
        last_activity_at: session.last_activity_at().to_rfc3339(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

// ════════════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════════════

/// Fetches a session and enforces that the caller owns it.
///
/// Users can only access their own sessions: a missing record maps to 404,
/// an ownership mismatch to 403.
async fn load_owned(
    state: &SessionState,
    session_id: &str,
    user_id: &str,
) -> Result<Session, Response> {
    match state.manager.get(session_id).await {
        Some(session) if session.user_id().as_str() == user_id => Ok(session),
        Some(_) => Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::forbidden(
                "Not authorized to access this session",
            )),
        )
            .into_response()),
        None => Err(session_not_found(session_id)),
    }
}

fn session_not_found(session_id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::not_found("Session", session_id)),
    )
        .into_response()
}

async fn change_status(
    state: &SessionState,
    session_id: &str,
    user_id: &str,
    status: SessionStatus,
) -> Response {
    if let Err(response) = load_owned(state, session_id, user_id).await {
        return response;
    }

    match state
        .manager
        .update(session_id, SessionPatch::new().with_status(status))
        .await
    {
        Ok(Some(session)) => {
            let response = StatusChangeResponse {
                session_id: session.session_id().to_string(),
                status: session.status(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(None) => session_not_found(session_id),
        Err(e) => handle_session_error(e, "change session status"),
    }
}

/// Applies search filters over an already-listed session set.
///
/// Status is an equality match; `query` matches case-insensitively against
/// the title (untitled sessions never match a query).
fn apply_search_filters(sessions: Vec<Session>, request: &SearchSessionsRequest) -> Vec<Session> {
    sessions
        .into_iter()
        .filter(|session| {
            request
                .status
                .map_or(true, |status| session.status() == status)
        })
        .filter(|session| {
            request.query.as_ref().map_or(true, |query| {
                session
                    .title()
                    .is_some_and(|title| title.to_lowercase().contains(&query.to_lowercase()))
            })
        })
        .collect()
}

/// Maps a manager error to a transport response.
///
/// No internal error detail is ever included in a response payload.
fn handle_session_error(err: SessionError, action: &str) -> Response {
    match err {
        SessionError::InvalidArgument { .. } => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(err.to_string())),
        )
            .into_response(),
        SessionError::StoreUnavailable(e) => {
            error!(error = %e, "Failed to {}", action);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal(format!("Failed to {}", action))),
            )
                .into_response()
        }
    }
}
