//! Bootstrap coordinator.
//!
//! The only component that orchestrates the others: it sequences the
//! post-login loads (user, then projects and types, then agents), resets
//! the per-conversation caches, and classifies failures. Steady-state UI
//! calls bypass it and talk to the registries directly.

use atelier_core::agent::registry::AgentRegistry;
use atelier_core::chat::engine::ConversationEngine;
use atelier_core::document::cache::DocumentCache;
use atelier_core::error::{AtelierError, Result};
use atelier_core::project::registry::ProjectRegistry;
use atelier_core::session::store::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Where the coordinator is in its lifecycle.
///
/// A later `bootstrap` call arriving while one is running is a silent
/// no-op, not queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapPhase {
    Idle,
    Bootstrapping,
}

/// Callback invoked with user-facing text for non-fatal failures.
pub type ErrorHandler = Arc<dyn Fn(String) + Send + Sync>;

/// Delay before the second token read when the first finds nothing. Covers
/// a just-completed login whose storage write has not yet landed.
const TOKEN_RETRY_DELAY: Duration = Duration::from_millis(150);

pub struct ResourceCoordinator {
    session: Arc<SessionStore>,
    projects: Arc<ProjectRegistry>,
    agents: Arc<AgentRegistry>,
    chat: Arc<ConversationEngine>,
    documents: Arc<DocumentCache>,
    phase: Mutex<BootstrapPhase>,
    /// Token of the last successful bootstrap. Short-circuits repeated
    /// calls for the same session, tolerating effect re-firing upstream.
    bootstrapped_token: Mutex<Option<String>>,
    on_error: Mutex<Option<ErrorHandler>>,
}

impl ResourceCoordinator {
    pub fn new(
        session: Arc<SessionStore>,
        projects: Arc<ProjectRegistry>,
        agents: Arc<AgentRegistry>,
        chat: Arc<ConversationEngine>,
        documents: Arc<DocumentCache>,
    ) -> Self {
        Self {
            session,
            projects,
            agents,
            chat,
            documents,
            phase: Mutex::new(BootstrapPhase::Idle),
            bootstrapped_token: Mutex::new(None),
            on_error: Mutex::new(None),
        }
    }

    /// Registers the callback that surfaces non-fatal failure text.
    pub async fn set_error_handler(&self, handler: ErrorHandler) {
        *self.on_error.lock().await = Some(handler);
    }

    pub async fn phase(&self) -> BootstrapPhase {
        *self.phase.lock().await
    }

    pub async fn is_bootstrapping(&self) -> bool {
        self.phase().await == BootstrapPhase::Bootstrapping
    }

    /// Runs the post-login load sequence.
    ///
    /// Overlapping calls are silent no-ops, and a token that was already
    /// bootstrapped short-circuits without network traffic. With no token
    /// at all (after one delayed re-read) the call clears all state and
    /// returns without touching the network.
    ///
    /// # Errors
    ///
    /// Only a fatal auth failure propagates; it forces a logout first.
    /// Rate-limit and transient failures are classified, surfaced through
    /// the error handler, and resolve as `Ok`.
    pub async fn bootstrap(&self) -> Result<()> {
        {
            let mut phase = self.phase.lock().await;
            if *phase == BootstrapPhase::Bootstrapping {
                return Ok(());
            }
            *phase = BootstrapPhase::Bootstrapping;
        }

        let outcome = self.run_bootstrap().await;
        *self.phase.lock().await = BootstrapPhase::Idle;

        match outcome {
            Ok(()) => Ok(()),
            Err(err) => self.recover(err).await,
        }
    }

    async fn run_bootstrap(&self) -> Result<()> {
        let Some(token) = self.preflight_token().await else {
            tracing::info!("no auth token; clearing session state");
            self.clear_all().await;
            return Ok(());
        };
        if self.bootstrapped_token.lock().await.as_deref() == Some(token.as_str()) {
            tracing::debug!("token already bootstrapped; skipping");
            return Ok(());
        }

        self.session.load_current_user().await?;
        tokio::try_join!(
            self.projects.load_projects(),
            self.projects.load_project_types(),
        )?;

        match self.projects.active_project_id().await {
            Some(project_id) => {
                // Agent-load failure does not fail the whole bootstrap.
                if let Err(err) = self.agents.load_agents(&project_id).await {
                    tracing::warn!(error = %err, "agent load failed during bootstrap");
                    self.notify(err.user_message()).await;
                }
            }
            None => self.agents.clear().await,
        }

        // A fresh project context invalidates all cached conversations
        // and documents.
        self.chat.reset().await;
        self.documents.reset().await;

        *self.bootstrapped_token.lock().await = Some(token);
        tracing::info!("bootstrap complete");
        Ok(())
    }

    /// Reads the token, re-reading once after a short delay if absent.
    async fn preflight_token(&self) -> Option<String> {
        if let Some(token) = self.session.token().await {
            return Some(token);
        }
        tokio::time::sleep(TOKEN_RETRY_DELAY).await;
        self.session.token().await
    }

    /// Classifies a bootstrap failure. Checked in priority order: auth,
    /// rate limit, then everything else as transient.
    async fn recover(&self, err: AtelierError) -> Result<()> {
        if err.is_auth() {
            tracing::warn!(error = %err, "fatal auth failure during bootstrap; forcing logout");
            self.clear_all().await;
            return Err(err);
        }
        if err.is_rate_limit() {
            tracing::warn!(error = %err, "rate limited during bootstrap");
            self.notify(err.user_message()).await;
            return Ok(());
        }

        // Transient or unclassified: preserve already-loaded user/projects
        // so a partial success on a prior call does not flash empty.
        let nothing_loaded =
            self.session.current_user().await.is_none() && self.projects.is_empty().await;
        if nothing_loaded {
            self.agents.clear().await;
            self.chat.reset().await;
            self.documents.reset().await;
        }
        tracing::warn!(error = %err, "transient bootstrap failure");
        self.notify(err.user_message()).await;
        Ok(())
    }

    /// Switches the active project and reloads everything scoped to it.
    ///
    /// A rejected id (not in the project list) and a re-select of the
    /// already-active project both leave the caches untouched: only a
    /// real context change invalidates conversations and documents.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, otherwise the agent-load
    /// error; the caller presents it. The caches are reset before the
    /// agent load, since the project context has already changed.
    pub async fn switch_project(&self, project_id: &str) -> Result<()> {
        let previous = self.projects.active_project_id().await;
        self.projects.select_project(project_id).await;
        if self.projects.active_project_id().await.as_deref() != Some(project_id) {
            return Err(AtelierError::not_found("project", project_id));
        }
        if previous.as_deref() == Some(project_id) {
            return Ok(());
        }

        self.chat.reset().await;
        self.documents.reset().await;
        self.agents.load_agents(project_id).await
    }

    /// Logout: clears every component and the bootstrap marker, so the
    /// next login starts from nothing.
    pub async fn reset(&self) {
        self.clear_all().await;
    }

    async fn clear_all(&self) {
        self.session.clear().await;
        self.projects.clear().await;
        self.agents.clear().await;
        self.chat.reset().await;
        self.documents.reset().await;
        *self.bootstrapped_token.lock().await = None;
    }

    async fn notify(&self, message: String) {
        if let Some(handler) = self.on_error.lock().await.as_ref() {
            handler(message);
        }
    }
}
