//! In-memory mock ports shared by the unit tests in this crate.

use crate::agent::model::Agent;
use crate::api::BackendApi;
use crate::chat::message::Message;
use crate::document::model::Document;
use crate::error::{AtelierError, Result};
use crate::prefs::PreferenceStore;
use crate::project::model::{Project, ProjectType};
use crate::session::model::User;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

/// Configurable in-memory backend.
///
/// Records per-operation call counts, returns configured fixtures, and can
/// inject one failure per operation name. An optional latency makes
/// interleaving tests deterministic: the guard under test must be set
/// before the awaited gap for the second task to observe it.
#[derive(Default)]
pub struct MockApi {
    user: Mutex<Option<User>>,
    projects: Mutex<Vec<Project>>,
    project_types: Mutex<Vec<ProjectType>>,
    agents: Mutex<Vec<Agent>>,
    messages: Mutex<Vec<Message>>,
    send_reply: Mutex<Vec<Message>>,
    documents: Mutex<Vec<Document>>,
    summary_doc: Mutex<Option<Document>>,
    failures: Mutex<HashMap<&'static str, AtelierError>>,
    calls: Mutex<HashMap<&'static str, usize>>,
    latency: Mutex<Option<Duration>>,
}

impl MockApi {
    pub async fn set_user(&self, user: User) {
        *self.user.lock().await = Some(user);
    }

    pub async fn set_projects(&self, projects: Vec<Project>) {
        *self.projects.lock().await = projects;
    }

    pub async fn set_project_types(&self, types: Vec<ProjectType>) {
        *self.project_types.lock().await = types;
    }

    pub async fn set_agents(&self, agents: Vec<Agent>) {
        *self.agents.lock().await = agents;
    }

    pub async fn set_messages(&self, messages: Vec<Message>) {
        *self.messages.lock().await = messages;
    }

    pub async fn set_send_reply(&self, messages: Vec<Message>) {
        *self.send_reply.lock().await = messages;
    }

    pub async fn set_documents(&self, documents: Vec<Document>) {
        *self.documents.lock().await = documents;
    }

    pub async fn set_summary_doc(&self, doc: Document) {
        *self.summary_doc.lock().await = Some(doc);
    }

    /// Makes the named operation fail once with the given error.
    pub async fn fail_once(&self, op: &'static str, err: AtelierError) {
        self.failures.lock().await.insert(op, err);
    }

    /// Adds an artificial await before every response.
    pub async fn set_latency(&self, latency: Duration) {
        *self.latency.lock().await = Some(latency);
    }

    /// Returns how many times the named operation was invoked.
    pub async fn calls(&self, op: &'static str) -> usize {
        self.calls.lock().await.get(op).copied().unwrap_or(0)
    }

    async fn enter(&self, op: &'static str) -> Result<()> {
        *self.calls.lock().await.entry(op).or_insert(0) += 1;
        let latency = *self.latency.lock().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(err) = self.failures.lock().await.remove(op) {
            return Err(err);
        }
        Ok(())
    }
}

#[async_trait]
impl BackendApi for MockApi {
    async fn current_user(&self) -> Result<User> {
        self.enter("current_user").await?;
        Ok(self.user.lock().await.clone().unwrap_or(User {
            id: "u-1".to_string(),
            email: "user@example.com".to_string(),
            name: "User".to_string(),
        }))
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.enter("list_projects").await?;
        Ok(self.projects.lock().await.clone())
    }

    async fn list_project_types(&self) -> Result<Vec<ProjectType>> {
        self.enter("list_project_types").await?;
        Ok(self.project_types.lock().await.clone())
    }

    async fn list_agents(&self, _project_id: &str) -> Result<Vec<Agent>> {
        self.enter("list_agents").await?;
        Ok(self.agents.lock().await.clone())
    }

    async fn list_messages(&self, _agent_id: &str, _project_id: &str) -> Result<Vec<Message>> {
        self.enter("list_messages").await?;
        Ok(self.messages.lock().await.clone())
    }

    async fn send_message(
        &self,
        _agent_id: &str,
        _project_id: &str,
        _text: &str,
    ) -> Result<Vec<Message>> {
        self.enter("send_message").await?;
        Ok(self.send_reply.lock().await.clone())
    }

    async fn clear_messages(&self, _agent_id: &str, _project_id: &str) -> Result<()> {
        self.enter("clear_messages").await
    }

    async fn document_summary(&self, _agent_id: &str, _project_id: &str) -> Result<Vec<Document>> {
        self.enter("document_summary").await?;
        Ok(self.documents.lock().await.clone())
    }

    async fn generate_summary(&self, _agent_id: &str, _project_id: &str) -> Result<Document> {
        self.enter("generate_summary").await?;
        self.summary_doc
            .lock()
            .await
            .clone()
            .ok_or_else(|| AtelierError::internal("no summary fixture configured"))
    }

    async fn upload_file(
        &self,
        _project_id: &str,
        file_name: &str,
        _data: &[u8],
    ) -> Result<Document> {
        self.enter("upload_file").await?;
        Ok(Document {
            id: format!("doc-{file_name}"),
            name: file_name.to_string(),
            mime_type: "text/plain".to_string(),
            content: String::new(),
            agent_id: None,
            is_knowledge_base: false,
        })
    }

    async fn delete_file(&self, _project_id: &str, _file_id: &str) -> Result<()> {
        self.enter("delete_file").await
    }
}

/// In-memory preference store.
#[derive(Default)]
pub struct MockPrefs {
    values: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl PreferenceStore for MockPrefs {
    async fn get(&self, key: &str) -> Option<String> {
        self.values.lock().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.lock().await.remove(key);
        Ok(())
    }
}
