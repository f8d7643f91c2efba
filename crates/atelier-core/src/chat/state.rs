//! Conversation state and its reducer.
//!
//! Every mutation of chat state goes through [`ChatState::apply`] with a
//! [`ChatAction`], so the full set of transitions is visible in one
//! exhaustive match and each arm can be unit tested without I/O.

use super::message::{Message, MessageKind, MessageRole};
use std::collections::{HashMap, HashSet};

/// A single transition of the conversation state.
#[derive(Debug, Clone)]
pub enum ChatAction {
    /// An agent's history was marked as being fetched. Set before the
    /// network await so concurrent loads collapse into one fetch.
    LoadMarked { agent_id: String },
    /// The history fetch finished; replaces the agent's history.
    HistoryLoaded {
        agent_id: String,
        messages: Vec<Message>,
    },
    /// The history fetch failed; un-marks the agent and empties its
    /// history so a future call retries.
    LoadFailed { agent_id: String },
    /// A send started: both placeholders appended atomically and the
    /// global in-flight flag raised.
    SendStarted {
        agent_id: String,
        user: Message,
        reply: Message,
    },
    /// The send succeeded: both placeholders stripped, server messages
    /// appended in server order, agent marked loaded, flag cleared.
    SendCommitted {
        agent_id: String,
        user_id: String,
        reply_id: String,
        messages: Vec<Message>,
    },
    /// The send failed: the reply placeholder is stripped, the user's text
    /// is kept (or re-added if a concurrent path removed it), a permanent
    /// error notice is appended, and the flag is cleared.
    SendFailed {
        agent_id: String,
        user: Message,
        reply_id: String,
        error_text: String,
    },
    /// The agent's history was cleared remotely; drops local history and
    /// the loaded mark so the next open re-fetches, confirming deletion.
    HistoryCleared { agent_id: String },
    /// Wipes every agent's history and the loaded set. Used on logout and
    /// on project switch, not on agent switch.
    Reset,
}

/// Per-agent message histories plus the load/send bookkeeping.
#[derive(Debug, Default)]
pub struct ChatState {
    /// Insertion order = conversation order, per agent.
    pub histories: HashMap<String, Vec<Message>>,
    /// Agents whose history has been fetched at least once. A cache
    /// population marker, not a freshness guarantee.
    pub loaded: HashSet<String>,
    /// Global send-in-flight flag. Deliberately not scoped per agent: a
    /// send to any agent blocks sends to every agent.
    pub sending: bool,
}

impl ChatState {
    pub fn apply(&mut self, action: ChatAction) {
        match action {
            ChatAction::LoadMarked { agent_id } => {
                self.loaded.insert(agent_id);
            }
            ChatAction::HistoryLoaded { agent_id, messages } => {
                self.histories.insert(agent_id, messages);
            }
            ChatAction::LoadFailed { agent_id } => {
                self.loaded.remove(&agent_id);
                self.histories.insert(agent_id, Vec::new());
            }
            ChatAction::SendStarted {
                agent_id,
                user,
                reply,
            } => {
                let history = self.histories.entry(agent_id).or_default();
                history.push(user);
                history.push(reply);
                self.sending = true;
            }
            ChatAction::SendCommitted {
                agent_id,
                user_id,
                reply_id,
                messages,
            } => {
                let history = self.histories.entry(agent_id.clone()).or_default();
                history.retain(|m| m.id != user_id && m.id != reply_id);
                history.extend(messages);
                self.loaded.insert(agent_id);
                self.sending = false;
            }
            ChatAction::SendFailed {
                agent_id,
                user,
                reply_id,
                error_text,
            } => {
                let history = self.histories.entry(agent_id).or_default();
                history.retain(|m| m.id != reply_id);
                // The optimistic user message is normally still present;
                // re-add only if a concurrent path already removed it.
                match history
                    .iter_mut()
                    .find(|m| m.role == MessageRole::User && m.text == user.text)
                {
                    Some(existing) => existing.kind = MessageKind::Persisted,
                    None => {
                        let mut user = user;
                        user.kind = MessageKind::Persisted;
                        history.push(user);
                    }
                }
                history.push(Message::error_notice(&error_text));
                self.sending = false;
            }
            ChatAction::HistoryCleared { agent_id } => {
                self.histories.remove(&agent_id);
                self.loaded.remove(&agent_id);
            }
            ChatAction::Reset => {
                self.histories.clear();
                self.loaded.clear();
            }
        }
    }

    /// Returns the history for one agent, empty if never loaded.
    pub fn history(&self, agent_id: &str) -> &[Message] {
        self.histories
            .get(agent_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
