//! SessionStatus enum for tracking the lifecycle of troubleshooting sessions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a troubleshooting session.
///
/// The conventional lifecycle is Active -> InProgress -> {Completed,
/// Archived, Abandoned}. No transition is enforced by the service; callers
/// may write any status through an update. Archive <-> Active is the one
/// bidirectional pair the API actively supports (archive/restore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Active,
    InProgress,
    Completed,
    Archived,
    Abandoned,
}

impl SessionStatus {
    /// Returns true if the session has been archived.
    pub fn is_archived(&self) -> bool {
        matches!(self, SessionStatus::Archived)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Active => "active",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Archived => "archived",
            SessionStatus::Abandoned => "abandoned",
        };
        write!(f, "{}", s)
    }
}
