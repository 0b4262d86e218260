//! Session operation error taxonomy.
//!
//! Not-found is not an error: operations that can miss return `Option`.
//! These variants cover the two failure classes a caller must distinguish -
//! structurally invalid input (rejected before any store access) and a
//! store that did not respond.

use thiserror::Error;

use crate::ports::StoreError;

/// Errors returned by session manager operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Caller supplied structurally invalid input.
    #[error("Invalid {field}: {message}")]
    InvalidArgument {
        field: &'static str,
        message: String,
    },

    /// The backing store failed to respond or returned an error.
    #[error("Session store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

impl SessionError {
    /// Creates an invalid-argument error for a named field.
    pub fn invalid_argument(field: &'static str, message: impl Into<String>) -> Self {
        SessionError::InvalidArgument {
            field,
            message: message.into(),
        }
    }

    /// Returns true for the invalid-argument class.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, SessionError::InvalidArgument { .. })
    }
}
