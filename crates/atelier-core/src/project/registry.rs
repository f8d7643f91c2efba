//! Project registry: owns the project list and the active selection.

use super::model::{Project, ProjectType};
use crate::api::BackendApi;
use crate::error::Result;
use crate::prefs::{PreferenceStore, keys};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct ProjectState {
    projects: Vec<Project>,
    project_types: Vec<ProjectType>,
    active_project_id: Option<String>,
}

/// Owns the list of projects, project types, and the active-project
/// selection.
///
/// The active selection persists across sessions (durable storage) and is
/// revalidated against the freshly loaded project list on every bootstrap:
/// a persisted id that no longer exists falls back to the first project.
pub struct ProjectRegistry {
    api: Arc<dyn BackendApi>,
    prefs: Arc<dyn PreferenceStore>,
    state: RwLock<ProjectState>,
}

impl ProjectRegistry {
    pub fn new(api: Arc<dyn BackendApi>, prefs: Arc<dyn PreferenceStore>) -> Self {
        Self {
            api,
            prefs,
            state: RwLock::new(ProjectState::default()),
        }
    }

    /// Loads the project list and resolves the active selection.
    ///
    /// Resolution order: current in-memory selection if still present,
    /// then the persisted last-used id, then the first project, then none.
    /// The resolved id is written back to durable storage (best-effort).
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails; existing state is left
    /// untouched so a partial bootstrap does not blank the UI.
    pub async fn load_projects(&self) -> Result<()> {
        let projects = self.api.list_projects().await?;
        let persisted = self.prefs.get(keys::LAST_PROJECT).await;

        let mut state = self.state.write().await;
        let current = state.active_project_id.clone();
        let resolved = [current, persisted]
            .into_iter()
            .flatten()
            .find(|id| projects.iter().any(|p| &p.id == id))
            .or_else(|| projects.first().map(|p| p.id.clone()));

        state.projects = projects;
        state.active_project_id = resolved.clone();
        drop(state);

        self.persist_selection(resolved.as_deref()).await;
        Ok(())
    }

    /// Loads the available project types.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails.
    pub async fn load_project_types(&self) -> Result<()> {
        let types = self.api.list_project_types().await?;
        self.state.write().await.project_types = types;
        Ok(())
    }

    /// Selects a project by id.
    ///
    /// Guarded assignment: takes effect only if `id` is a member of the
    /// current project list, preventing selection of a stale or foreign id.
    pub async fn select_project(&self, id: &str) {
        let mut state = self.state.write().await;
        if state.projects.iter().any(|p| p.id == id) {
            state.active_project_id = Some(id.to_string());
            drop(state);
            self.persist_selection(Some(id)).await;
        }
    }

    /// Returns the active project id, if any.
    pub async fn active_project_id(&self) -> Option<String> {
        self.state.read().await.active_project_id.clone()
    }

    /// Returns the active project, if any.
    pub async fn active_project(&self) -> Option<Project> {
        let state = self.state.read().await;
        let id = state.active_project_id.as_deref()?;
        state.projects.iter().find(|p| p.id == id).cloned()
    }

    /// Returns a snapshot of the project list.
    pub async fn projects(&self) -> Vec<Project> {
        self.state.read().await.projects.clone()
    }

    /// Returns a snapshot of the project types.
    pub async fn project_types(&self) -> Vec<ProjectType> {
        self.state.read().await.project_types.clone()
    }

    /// Returns true if no projects have been loaded.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.projects.is_empty()
    }

    /// Clears projects, types, and the active selection, including the
    /// persisted marker. Used on logout and fatal auth failure.
    pub async fn clear(&self) {
        *self.state.write().await = ProjectState::default();
        self.persist_selection(None).await;
    }

    async fn persist_selection(&self, id: Option<&str>) {
        let outcome = match id {
            Some(id) => self.prefs.set(keys::LAST_PROJECT, id).await,
            None => self.prefs.remove(keys::LAST_PROJECT).await,
        };
        if let Err(err) = outcome {
            tracing::warn!(error = %err, "failed to persist active project selection");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockApi, MockPrefs};

    fn project(id: &str) -> Project {
        Project {
            id: id.to_string(),
            name: format!("Project {id}"),
            description: None,
            project_type_id: "pt-1".to_string(),
            agent_count: 0,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_persisted_selection_revalidated() {
        let api = Arc::new(MockApi::default());
        api.set_projects(vec![project("p1"), project("p2")]).await;
        let prefs = Arc::new(MockPrefs::default());
        prefs.set(keys::LAST_PROJECT, "p2").await.unwrap();

        let registry = ProjectRegistry::new(api, prefs);
        registry.load_projects().await.unwrap();

        assert_eq!(registry.active_project_id().await.as_deref(), Some("p2"));
    }

    #[tokio::test]
    async fn test_stale_persisted_selection_falls_back_to_first() {
        let api = Arc::new(MockApi::default());
        api.set_projects(vec![project("p1"), project("p2")]).await;
        let prefs = Arc::new(MockPrefs::default());
        prefs.set(keys::LAST_PROJECT, "deleted").await.unwrap();

        let registry = ProjectRegistry::new(api, prefs);
        registry.load_projects().await.unwrap();

        assert_eq!(registry.active_project_id().await.as_deref(), Some("p1"));
    }

    #[tokio::test]
    async fn test_select_project_rejects_foreign_id() {
        let api = Arc::new(MockApi::default());
        api.set_projects(vec![project("p1")]).await;
        let registry = ProjectRegistry::new(api, Arc::new(MockPrefs::default()));
        registry.load_projects().await.unwrap();

        registry.select_project("not-mine").await;

        assert_eq!(registry.active_project_id().await.as_deref(), Some("p1"));
    }

    #[tokio::test]
    async fn test_clear_removes_persisted_marker() {
        let api = Arc::new(MockApi::default());
        api.set_projects(vec![project("p1")]).await;
        let prefs = Arc::new(MockPrefs::default());
        let registry = ProjectRegistry::new(api, prefs.clone());
        registry.load_projects().await.unwrap();

        registry.clear().await;

        assert!(registry.active_project_id().await.is_none());
        assert!(prefs.get(keys::LAST_PROJECT).await.is_none());
    }
}
