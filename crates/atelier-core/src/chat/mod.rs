//! Conversation domain: per-agent message histories and the send protocol.

pub mod engine;
pub mod message;
pub mod state;

pub use engine::ConversationEngine;
pub use message::{Message, MessageKind, MessageRole};
pub use state::{ChatAction, ChatState};
