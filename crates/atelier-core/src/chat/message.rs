//! Conversation message types.

use serde::{Deserialize, Serialize};

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the model.
    Model,
}

/// Distinguishes server-confirmed messages from optimistic placeholders.
///
/// Placeholders are client-only: they are inserted before the send round
/// trip completes and must be reconciled (replaced or removed) before the
/// send is considered finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    /// Confirmed by the server, or a permanent local record after rollback.
    Persisted,
    /// Optimistic copy of the user's outgoing text.
    PendingUser,
    /// Streaming placeholder for the model reply being generated.
    PendingReply,
}

/// A single message in a conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique id. Placeholders carry synthetic client-side UUIDs.
    pub id: String,
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub text: String,
    /// Timestamp when the message was created (ISO 8601 format).
    pub timestamp: String,
    /// Placeholder discriminant; `Persisted` for server-confirmed messages.
    #[serde(default = "MessageKind::persisted")]
    pub kind: MessageKind,
    /// True for the permanent failure notice appended after a failed send.
    #[serde(default)]
    pub is_error: bool,
}

impl MessageKind {
    fn persisted() -> Self {
        Self::Persisted
    }
}

impl Message {
    /// Optimistic copy of the user's outgoing text, with a synthetic id.
    pub fn pending_user(text: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: MessageRole::User,
            text: text.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            kind: MessageKind::PendingUser,
            is_error: false,
        }
    }

    /// Streaming placeholder for the reply being generated.
    pub fn pending_reply() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: MessageRole::Model,
            text: String::new(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            kind: MessageKind::PendingReply,
            is_error: false,
        }
    }

    /// Permanent failure notice shown in place of the reply.
    pub fn error_notice(text: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: MessageRole::Model,
            text: text.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            kind: MessageKind::Persisted,
            is_error: true,
        }
    }
}
