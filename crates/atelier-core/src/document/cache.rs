//! Project-scoped document cache.

use super::model::{Document, DocumentKey};
use crate::agent::registry::AgentRegistry;
use crate::api::BackendApi;
use crate::error::{AtelierError, Result};
use crate::project::registry::ProjectRegistry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct DocumentState {
    documents: HashMap<DocumentKey, Vec<Document>>,
    loaded: HashSet<DocumentKey>,
}

/// Owns the per-project document lists.
///
/// Documents are shared by every agent in a project, so the cache is keyed
/// by [`DocumentKey`] (one per project) and an agent switch never triggers
/// a re-fetch. Mutating operations invalidate the key and re-fetch the
/// authoritative list instead of patching it locally; one extra round trip
/// buys correctness against concurrent edits.
pub struct DocumentCache {
    api: Arc<dyn BackendApi>,
    projects: Arc<ProjectRegistry>,
    agents: Arc<AgentRegistry>,
    state: RwLock<DocumentState>,
}

impl DocumentCache {
    pub fn new(
        api: Arc<dyn BackendApi>,
        projects: Arc<ProjectRegistry>,
        agents: Arc<AgentRegistry>,
    ) -> Self {
        Self {
            api,
            projects,
            agents,
            state: RwLock::new(DocumentState::default()),
        }
    }

    /// Returns the cached document list for the active project.
    pub async fn documents(&self) -> Vec<Document> {
        let Some(key) = self.active_key().await else {
            return Vec::new();
        };
        self.state
            .read()
            .await
            .documents
            .get(&key)
            .cloned()
            .unwrap_or_default()
    }

    /// Fetches the active project's documents unless already fetched.
    ///
    /// The key is marked loaded before the network await, so concurrent
    /// calls collapse into one fetch. A backend 404 means "zero documents":
    /// the key is marked loaded with an empty list and no error is raised.
    ///
    /// # Errors
    ///
    /// Returns the fetch error (other than 404); the key is un-marked so a
    /// future call retries.
    pub async fn ensure_summary_loaded(&self) -> Result<()> {
        let Some(key) = self.active_key().await else {
            return Ok(());
        };
        let Some(agent_id) = self.agents.active_agent_id().await else {
            return Ok(());
        };

        {
            let mut state = self.state.write().await;
            if state.loaded.contains(&key) {
                return Ok(());
            }
            state.loaded.insert(key.clone());
        }

        match self
            .api
            .document_summary(&agent_id, key.project_id())
            .await
        {
            Ok(documents) => {
                self.state.write().await.documents.insert(key, documents);
                Ok(())
            }
            Err(err) if err.is_not_found() => {
                self.state.write().await.documents.insert(key, Vec::new());
                Ok(())
            }
            Err(err) => {
                let mut state = self.state.write().await;
                state.loaded.remove(&key);
                state.documents.remove(&key);
                Err(err)
            }
        }
    }

    /// Asks the backend to generate a summary document for the active agent.
    ///
    /// The new document is prepended (most-recent-first) for immediate
    /// display, then the key is invalidated so the next
    /// [`Self::ensure_summary_loaded`] re-fetches the authoritative list;
    /// generation can rename or supersede documents server-side.
    ///
    /// # Errors
    ///
    /// Returns the generation error; the cache is left untouched.
    pub async fn generate_summary(&self) -> Result<()> {
        let Some(key) = self.active_key().await else {
            return Ok(());
        };
        let Some(agent_id) = self.agents.active_agent_id().await else {
            return Ok(());
        };

        let document = self
            .api
            .generate_summary(&agent_id, key.project_id())
            .await?;

        let mut state = self.state.write().await;
        state
            .documents
            .entry(key.clone())
            .or_default()
            .insert(0, document);
        state.loaded.remove(&key);
        Ok(())
    }

    /// Uploads a file into the active project's document pool.
    ///
    /// # Errors
    ///
    /// Returns the upload or re-fetch error.
    pub async fn upload_file(&self, file_name: &str, data: &[u8]) -> Result<()> {
        let Some(key) = self.active_key().await else {
            return Ok(());
        };

        self.api
            .upload_file(key.project_id(), file_name, data)
            .await?;
        self.invalidate(&key).await;
        self.ensure_summary_loaded().await
    }

    /// Removes a file from the active project's document pool.
    ///
    /// Knowledge-base documents are administrator-managed: removing one is
    /// rejected here, before any network call.
    ///
    /// # Errors
    ///
    /// Returns a domain error for knowledge-base documents, otherwise the
    /// delete or re-fetch error.
    pub async fn remove_file(&self, file_id: &str) -> Result<()> {
        let Some(key) = self.active_key().await else {
            return Ok(());
        };

        let is_knowledge_base = self
            .state
            .read()
            .await
            .documents
            .get(&key)
            .and_then(|docs| docs.iter().find(|d| d.id == file_id))
            .is_some_and(|d| d.is_knowledge_base);
        if is_knowledge_base {
            return Err(AtelierError::domain(
                "knowledge base files can only be removed by an administrator",
            ));
        }

        self.api.delete_file(key.project_id(), file_id).await?;
        self.invalidate(&key).await;
        self.ensure_summary_loaded().await
    }

    /// Drops every project's cached documents. Used on logout.
    pub async fn reset(&self) {
        *self.state.write().await = DocumentState::default();
    }

    async fn active_key(&self) -> Option<DocumentKey> {
        let project_id = self.projects.active_project_id().await?;
        Some(DocumentKey::for_project(&project_id))
    }

    async fn invalidate(&self, key: &DocumentKey) {
        let mut state = self.state.write().await;
        state.loaded.remove(key);
        state.documents.remove(key);
    }
}
