//! Message entity - one entry in a session's conversation history.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::{MessageId, Timestamp};

/// A single message within a session conversation.
///
/// Messages are owned exclusively by one session and have no independent
/// lifecycle; the session's `messages` sequence is append-only, ordered by
/// arrival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier for this message.
    message_id: MessageId,

    /// Message role (conventionally "user", "assistant", or "system").
    role: String,

    /// Message content.
    content: String,

    /// When the message arrived.
    timestamp: Timestamp,

    /// Additional message metadata.
    #[serde(default)]
    metadata: Map<String, Value>,
}

impl Message {
    /// Creates a new message stamped with the current time.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            message_id: MessageId::new(),
            role: role.into(),
            content: content.into(),
            timestamp: Timestamp::now(),
            metadata: Map::new(),
        }
    }

    /// Attaches metadata to the message.
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns the message ID.
    pub fn message_id(&self) -> &MessageId {
        &self.message_id
    }

    /// Returns the message role.
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Returns the message content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns when the message arrived.
    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    /// Returns the message metadata.
    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }
}
