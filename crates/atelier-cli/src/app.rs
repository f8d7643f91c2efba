//! Wires the component graph behind the CLI commands.

use anyhow::Result;
use atelier_application::ResourceCoordinator;
use atelier_client::{RestBackend, RestConfig};
use atelier_core::agent::registry::AgentRegistry;
use atelier_core::chat::engine::ConversationEngine;
use atelier_core::document::cache::DocumentCache;
use atelier_core::prefs::PreferenceStore;
use atelier_core::project::registry::ProjectRegistry;
use atelier_core::session::store::{SessionStore, StoredTokenSource};
use atelier_infrastructure::{ClientConfig, TomlPreferenceStore};
use std::sync::Arc;
use std::time::Duration;

pub struct AppContext {
    pub session: Arc<SessionStore>,
    pub projects: Arc<ProjectRegistry>,
    pub agents: Arc<AgentRegistry>,
    pub chat: Arc<ConversationEngine>,
    pub documents: Arc<DocumentCache>,
    pub coordinator: Arc<ResourceCoordinator>,
}

impl AppContext {
    /// Builds the full component graph from durable config and state.
    pub fn build() -> Result<Self> {
        let config = ClientConfig::load()?;
        let prefs: Arc<dyn PreferenceStore> = Arc::new(TomlPreferenceStore::new()?);

        // The HTTP client reads the token straight from durable storage so
        // it can be constructed before the session store.
        let tokens = Arc::new(StoredTokenSource::new(prefs.clone()));
        let api = Arc::new(RestBackend::new(
            RestConfig {
                base_url: config.base_url.clone(),
                request_timeout: Duration::from_millis(config.request_timeout_ms),
                model_timeout: Duration::from_millis(config.model_timeout_ms),
                rate_limit_cooldown: Duration::from_secs(config.rate_limit_cooldown_secs),
            },
            tokens,
        )?);

        let session = Arc::new(SessionStore::new(api.clone(), prefs.clone()));
        let projects = Arc::new(ProjectRegistry::new(api.clone(), prefs.clone()));
        let agents = Arc::new(AgentRegistry::new(api.clone()));
        let chat = Arc::new(ConversationEngine::new(
            api.clone(),
            projects.clone(),
            agents.clone(),
        ));
        let documents = Arc::new(DocumentCache::new(api, projects.clone(), agents.clone()));
        let coordinator = Arc::new(ResourceCoordinator::new(
            session.clone(),
            projects.clone(),
            agents.clone(),
            chat.clone(),
            documents.clone(),
        ));

        Ok(Self {
            session,
            projects,
            agents,
            chat,
            documents,
            coordinator,
        })
    }

    /// Bootstraps and registers a stderr handler for non-fatal failures.
    pub async fn bootstrap(&self) -> Result<()> {
        self.coordinator
            .set_error_handler(Arc::new(|text| eprintln!("warning: {text}")))
            .await;
        self.coordinator.bootstrap().await?;
        Ok(())
    }
}
