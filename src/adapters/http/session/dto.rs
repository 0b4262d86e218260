//! HTTP DTOs for session endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::session::{Message, Session, SessionStatus};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to create a new session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSessionRequest {
    /// Client-facing session timeout in minutes (bounded by config).
    pub timeout_minutes: Option<u32>,
    /// Type of session; folded into metadata.
    pub session_type: Option<String>,
    /// Client/device identifier for session resumption.
    pub client_id: Option<String>,
    /// Additional session metadata.
    pub metadata: Option<Map<String, Value>>,
}

/// Request to update a session. Absent fields leave the record untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSessionRequest {
    pub title: Option<String>,
    pub status: Option<SessionStatus>,
    pub context: Option<Map<String, Value>>,
    pub metadata: Option<Map<String, Value>>,
}

/// Query parameters for listing sessions.
#[derive(Debug, Clone, Deserialize)]
pub struct ListSessionsQuery {
    #[serde(default = "default_list_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_list_limit() -> usize {
    50
}

/// Request to append a message to a session.
#[derive(Debug, Clone, Deserialize)]
pub struct AddMessageRequest {
    #[serde(default = "default_message_role")]
    pub role: String,
    pub content: String,
    pub metadata: Option<Map<String, Value>>,
}

fn default_message_role() -> String {
    "user".to_string()
}

/// Query parameters for reading session messages.
#[derive(Debug, Clone, Deserialize)]
pub struct ListMessagesQuery {
    #[serde(default = "default_messages_limit")]
    pub limit: usize,
}

fn default_messages_limit() -> usize {
    100
}

/// Request to search the caller's sessions.
///
/// Filters are applied client-side over the caller's own set: status is an
/// equality match, `query` a case-insensitive title substring match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchSessionsRequest {
    pub status: Option<SessionStatus>,
    pub query: Option<String>,
    pub limit: Option<usize>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Detailed session view for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub last_activity_at: String,
    pub status: SessionStatus,
    pub message_count: usize,
    pub metadata: Map<String, Value>,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.session_id().to_string(),
            user_id: session.user_id().to_string(),
            title: session.title().map(str::to_string),
            client_id: session.client_id().map(str::to_string),
            created_at: session.created_at().to_rfc3339(),
            updated_at: session.updated_at().to_rfc3339(),
            last_activity_at: session.last_activity_at().to_rfc3339(),
            status: session.status(),
            message_count: session.message_count(),
            metadata: session.metadata().clone(),
        }
    }
}

/// Paginated list of sessions.
#[derive(Debug, Clone, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionResponse>,
    pub total: u64,
    pub limit: usize,
    pub offset: usize,
}

/// Response for the heartbeat endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct HeartbeatResponse {
    pub session_id: String,
    pub last_activity_at: String,
    pub status: SessionStatus,
    pub message: String,
}

impl HeartbeatResponse {
    pub fn from_session(session: &Session) -> Self {
        Self {
            session_id: session.session_id().to_string(),
            last_activity_at: session.last_activity_at().to_rfc3339(),
            status: session.status(),
            message: "Heartbeat updated".to_string(),
        }
    }
}

/// Response for archive/restore operations.
#[derive(Debug, Clone, Serialize)]
pub struct StatusChangeResponse {
    pub session_id: String,
    pub status: SessionStatus,
}

/// One message in a response payload.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message_id: String,
    pub role: String,
    pub content: String,
    pub timestamp: String,
    pub metadata: Map<String, Value>,
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            message_id: message.message_id().to_string(),
            role: message.role().to_string(),
            content: message.content().to_string(),
            timestamp: message.timestamp().to_rfc3339(),
            metadata: message.metadata().clone(),
        }
    }
}

/// Response after appending a message.
#[derive(Debug, Clone, Serialize)]
pub struct MessageAppendedResponse {
    pub session_id: String,
    pub message: MessageResponse,
    pub total_messages: usize,
}

/// Response for reading session messages.
#[derive(Debug, Clone, Serialize)]
pub struct MessagesResponse {
    pub session_id: String,
    pub messages: Vec<MessageResponse>,
    pub total: usize,
    pub returned: usize,
}

/// Session summary for search results.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummaryResponse {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub status: SessionStatus,
    pub created_at: String,
    pub message_count: usize,
}

impl From<&Session> for SessionSummaryResponse {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.session_id().to_string(),
            title: session.title().map(str::to_string),
            status: session.status(),
            created_at: session.created_at().to_rfc3339(),
            message_count: session.message_count(),
        }
    }
}

/// Response for session search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub sessions: Vec<SessionSummaryResponse>,
    pub total: usize,
}

/// Response for session statistics.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatsResponse {
    pub session_id: String,
    pub message_count: usize,
    pub duration_seconds: i64,
    pub status: SessionStatus,
    pub created_at: String,
    pub last_activity_at: String,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            code: "UNAUTHORIZED".to_string(),
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            code: "FORBIDDEN".to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self {
            code: "NOT_FOUND".to_string(),
            message: format!("{} not found: {}", resource_type, id),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
        }
    }
}
