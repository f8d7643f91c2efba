//! Conversation engine: optimistic sends, history loads, and rollback.

use super::message::Message;
use super::state::{ChatAction, ChatState};
use crate::agent::registry::AgentRegistry;
use crate::api::BackendApi;
use crate::error::{AtelierError, Result};
use crate::project::registry::ProjectRegistry;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Owns per-agent message histories, the loaded-set, and the global
/// send-in-flight flag.
///
/// The engine performs optimistic message insertion: the user's text and a
/// streaming reply placeholder are appended before the network round trip,
/// then reconciled against the server's response or rolled back into a
/// permanent in-conversation error notice. `send_message` never returns a
/// network error to its caller; the failure becomes part of the thread.
pub struct ConversationEngine {
    api: Arc<dyn BackendApi>,
    projects: Arc<ProjectRegistry>,
    agents: Arc<AgentRegistry>,
    state: RwLock<ChatState>,
}

impl ConversationEngine {
    pub fn new(
        api: Arc<dyn BackendApi>,
        projects: Arc<ProjectRegistry>,
        agents: Arc<AgentRegistry>,
    ) -> Self {
        Self {
            api,
            projects,
            agents,
            state: RwLock::new(ChatState::default()),
        }
    }

    /// Returns the history of the active agent, empty if none is selected.
    pub async fn messages(&self) -> Vec<Message> {
        let Some(agent_id) = self.agents.active_agent_id().await else {
            return Vec::new();
        };
        self.state.read().await.history(&agent_id).to_vec()
    }

    /// True while any send is in flight, for any agent.
    pub async fn is_sending(&self) -> bool {
        self.state.read().await.sending
    }

    /// Fetches an agent's history unless it was already fetched.
    ///
    /// The agent is marked loaded *before* the network call returns, so
    /// concurrent calls collapse into a single fetch. On failure the mark
    /// is removed and the history emptied, allowing a future retry.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; the caller is expected to surface it.
    pub async fn ensure_messages_loaded(&self, agent_id: &str) -> Result<()> {
        let Some(project_id) = self.projects.active_project_id().await else {
            return Ok(());
        };

        {
            let mut state = self.state.write().await;
            if state.loaded.contains(agent_id) {
                return Ok(());
            }
            state.apply(ChatAction::LoadMarked {
                agent_id: agent_id.to_string(),
            });
        }

        match self.api.list_messages(agent_id, &project_id).await {
            Ok(messages) => {
                self.state.write().await.apply(ChatAction::HistoryLoaded {
                    agent_id: agent_id.to_string(),
                    messages,
                });
                Ok(())
            }
            Err(err) => {
                self.state.write().await.apply(ChatAction::LoadFailed {
                    agent_id: agent_id.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Sends a message to the active agent.
    ///
    /// Preconditions: an active project must be selected (error), an active
    /// agent must be selected and the text non-blank (silent no-ops), and
    /// no send may already be in flight anywhere (silent no-op).
    ///
    /// # Errors
    ///
    /// Returns an error only for the missing-project precondition. Network
    /// failures are rolled back into an in-conversation error notice and
    /// the method resolves normally.
    pub async fn send_message(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let project_id = self
            .projects
            .active_project_id()
            .await
            .ok_or_else(|| AtelierError::domain("no active project selected"))?;
        let Some(agent_id) = self.agents.active_agent_id().await else {
            return Ok(());
        };

        // Raise the flag and insert both placeholders under one lock, before
        // the first await, so an interleaved second send observes the guard.
        let (user, reply) = {
            let mut state = self.state.write().await;
            if state.sending {
                return Ok(());
            }
            let user = Message::pending_user(text);
            let reply = Message::pending_reply();
            state.apply(ChatAction::SendStarted {
                agent_id: agent_id.clone(),
                user: user.clone(),
                reply: reply.clone(),
            });
            (user, reply)
        };

        match self.api.send_message(&agent_id, &project_id, text).await {
            Ok(messages) => {
                self.state.write().await.apply(ChatAction::SendCommitted {
                    agent_id,
                    user_id: user.id,
                    reply_id: reply.id,
                    messages,
                });
            }
            Err(err) => {
                tracing::warn!(agent_id = %agent_id, error = %err, "message send failed");
                self.state.write().await.apply(ChatAction::SendFailed {
                    agent_id,
                    user,
                    reply_id: reply.id,
                    error_text: err.user_message(),
                });
            }
        }
        Ok(())
    }

    /// Clears the active agent's conversation on the server, then locally.
    ///
    /// The loaded mark is dropped so the next open re-fetches from the
    /// server, confirming the deletion.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote clear fails; local history is kept
    /// in that case.
    pub async fn clear_chat(&self) -> Result<()> {
        let project_id = self
            .projects
            .active_project_id()
            .await
            .ok_or_else(|| AtelierError::domain("no active project selected"))?;
        let Some(agent_id) = self.agents.active_agent_id().await else {
            return Ok(());
        };

        self.api.clear_messages(&agent_id, &project_id).await?;
        self.state
            .write()
            .await
            .apply(ChatAction::HistoryCleared { agent_id });
        Ok(())
    }

    /// Wipes every agent's history and the loaded set.
    ///
    /// Used on logout and on project switch: a fresh project context
    /// invalidates all cached conversations. Not called on agent switch.
    pub async fn reset(&self) {
        self.state.write().await.apply(ChatAction::Reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::message::{MessageKind, MessageRole};
    use crate::prefs::PreferenceStore;
    use crate::testing::{MockApi, MockPrefs};
    use std::time::Duration;

    async fn engine_with(api: Arc<MockApi>) -> Arc<ConversationEngine> {
        let prefs = Arc::new(MockPrefs::default());
        prefs.set(crate::prefs::keys::LAST_PROJECT, "p1").await.unwrap();
        api.set_projects(vec![crate::project::model::Project {
            id: "p1".to_string(),
            name: "P1".to_string(),
            description: None,
            project_type_id: "pt".to_string(),
            agent_count: 1,
            created_at: String::new(),
            updated_at: String::new(),
        }])
        .await;
        api.set_agents(vec![crate::agent::model::Agent {
            id: "a1".to_string(),
            name: "A1".to_string(),
            role: None,
            model: "atelier-1".to_string(),
            order: 0,
            system_instruction: String::new(),
            summary_instruction: String::new(),
            files: Vec::new(),
        }])
        .await;

        let projects = Arc::new(ProjectRegistry::new(api.clone(), prefs));
        projects.load_projects().await.unwrap();
        let agents = Arc::new(AgentRegistry::new(api.clone()));
        agents.load_agents("p1").await.unwrap();
        Arc::new(ConversationEngine::new(api, projects, agents))
    }

    fn server_message(id: &str, role: MessageRole, text: &str) -> Message {
        Message {
            id: id.to_string(),
            role,
            text: text.to_string(),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            kind: MessageKind::Persisted,
            is_error: false,
        }
    }

    #[tokio::test]
    async fn test_send_success_reconciles_with_server_order() {
        let api = Arc::new(MockApi::default());
        api.set_send_reply(vec![
            server_message("s1", MessageRole::User, "hi"),
            server_message("s2", MessageRole::Model, "hello"),
        ])
        .await;
        let engine = engine_with(api).await;

        engine.send_message("hi").await.unwrap();

        let messages = engine.messages().await;
        let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2"]);
        assert!(!engine.is_sending().await);
    }

    #[tokio::test]
    async fn test_send_failure_rolls_back_without_duplicate() {
        let api = Arc::new(MockApi::default());
        api.fail_once("send_message", AtelierError::server(503, "down"))
            .await;
        let engine = engine_with(api).await;

        engine.send_message("hi").await.unwrap();

        let messages = engine.messages().await;
        let user_count = messages
            .iter()
            .filter(|m| m.role == MessageRole::User && m.text == "hi")
            .count();
        assert_eq!(user_count, 1);
        assert_eq!(messages.len(), 2);
        assert!(messages[1].is_error);
        assert!(!engine.is_sending().await);
    }

    #[tokio::test]
    async fn test_blank_text_is_silent_noop() {
        let api = Arc::new(MockApi::default());
        let engine = engine_with(api.clone()).await;

        engine.send_message("   ").await.unwrap();

        assert!(engine.messages().await.is_empty());
        assert_eq!(api.calls("send_message").await, 0);
    }

    #[tokio::test]
    async fn test_no_active_project_is_an_error() {
        let api = Arc::new(MockApi::default());
        let projects = Arc::new(ProjectRegistry::new(
            api.clone(),
            Arc::new(MockPrefs::default()),
        ));
        let agents = Arc::new(AgentRegistry::new(api.clone()));
        let engine = ConversationEngine::new(api, projects, agents);

        let err = engine.send_message("hi").await.unwrap_err();
        assert!(matches!(err, AtelierError::Domain(_)));
    }

    #[tokio::test]
    async fn test_second_send_blocked_while_first_in_flight() {
        let api = Arc::new(MockApi::default());
        api.set_latency(Duration::from_millis(30)).await;
        api.set_send_reply(vec![server_message("s1", MessageRole::User, "first")])
            .await;
        let engine = engine_with(api.clone()).await;

        let first = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.send_message("first").await })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        engine.send_message("second").await.unwrap();
        first.await.unwrap().unwrap();

        // The overlapping send was dropped without reaching the network.
        assert_eq!(api.calls("send_message").await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_history_loads_collapse_to_one_fetch() {
        let api = Arc::new(MockApi::default());
        api.set_latency(Duration::from_millis(20)).await;
        let engine = engine_with(api.clone()).await;
        // engine_with itself performs loads; reset the counter's baseline.
        let baseline = api.calls("list_messages").await;

        let (a, b) = tokio::join!(
            engine.ensure_messages_loaded("a1"),
            engine.ensure_messages_loaded("a1"),
        );
        a.unwrap();
        b.unwrap();

        assert_eq!(api.calls("list_messages").await - baseline, 1);
    }

    #[tokio::test]
    async fn test_failed_history_load_can_be_retried() {
        let api = Arc::new(MockApi::default());
        let engine = engine_with(api.clone()).await;

        api.fail_once("list_messages", AtelierError::network("offline"))
            .await;
        assert!(engine.ensure_messages_loaded("a1").await.is_err());

        api.set_messages(vec![server_message("m1", MessageRole::User, "hi")])
            .await;
        engine.ensure_messages_loaded("a1").await.unwrap();

        assert_eq!(engine.messages().await.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_chat_forces_refetch_on_next_open() {
        let api = Arc::new(MockApi::default());
        api.set_messages(vec![server_message("m1", MessageRole::User, "hi")])
            .await;
        let engine = engine_with(api.clone()).await;
        engine.ensure_messages_loaded("a1").await.unwrap();
        let baseline = api.calls("list_messages").await;

        engine.clear_chat().await.unwrap();
        assert!(engine.messages().await.is_empty());

        engine.ensure_messages_loaded("a1").await.unwrap();
        assert_eq!(api.calls("list_messages").await - baseline, 1);
    }
}
