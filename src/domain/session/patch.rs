//! Structured partial update for a session.

use serde_json::{Map, Value};

use super::SessionStatus;

/// A typed partial update applied by [`Session::apply_patch`].
///
/// Each field is optional; absent fields leave the record untouched.
/// `title` and `status` are whole-value replacements. `context` and
/// `metadata` are shallow-merged key-wise: supplied keys overwrite,
/// existing keys are preserved, and there is no way to delete a key.
///
/// [`Session::apply_patch`]: super::Session::apply_patch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatch {
    pub title: Option<String>,
    pub status: Option<SessionStatus>,
    pub context: Option<Map<String, Value>>,
    pub metadata: Option<Map<String, Value>>,
}

impl SessionPatch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title replacement.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the status replacement.
    pub fn with_status(mut self, status: SessionStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the context entries to merge in.
    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = Some(context);
        self
    }

    /// Sets the metadata entries to merge in.
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Returns true if the patch carries no changes.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.status.is_none()
            && self.context.is_none()
            && self.metadata.is_none()
    }
}
