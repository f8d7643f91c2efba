//! Agent registry: owns the sorted agent roster for the active project.

use super::model::Agent;
use crate::api::BackendApi;
use crate::error::Result;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct AgentState {
    agents: Vec<Agent>,
    active_agent_id: Option<String>,
}

/// Owns, per active project, the sorted agent list and the active-agent
/// selection.
pub struct AgentRegistry {
    api: Arc<dyn BackendApi>,
    state: RwLock<AgentState>,
}

impl AgentRegistry {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self {
            api,
            state: RwLock::new(AgentState::default()),
        }
    }

    /// Loads the agents of one project.
    ///
    /// A blank `project_id` is a no-op that clears the roster and the
    /// active selection; callers must not pass a blank id to fetch.
    ///
    /// After a successful load the roster is sorted by `order` ascending
    /// with id as tiebreak, and the active selection is resolved: the
    /// previous id is kept if it survives, otherwise the first agent in
    /// sorted order, otherwise none.
    ///
    /// # Errors
    ///
    /// On fetch failure the roster and selection are cleared and the error
    /// is returned. Bootstrap treats this as non-fatal; direct UI callers
    /// must handle it themselves.
    pub async fn load_agents(&self, project_id: &str) -> Result<()> {
        if project_id.trim().is_empty() {
            self.clear().await;
            return Ok(());
        }

        let mut agents = match self.api.list_agents(project_id).await {
            Ok(agents) => agents,
            Err(err) => {
                self.clear().await;
                return Err(err);
            }
        };
        agents.sort_by(|a, b| a.display_cmp(b));

        let mut state = self.state.write().await;
        let previous = state.active_agent_id.take();
        state.active_agent_id = previous
            .filter(|id| agents.iter().any(|a| &a.id == id))
            .or_else(|| agents.first().map(|a| a.id.clone()));
        state.agents = agents;
        Ok(())
    }

    /// Selects an agent by id.
    ///
    /// Guarded assignment: takes effect only if `id` is a member of the
    /// current roster.
    pub async fn select_agent(&self, id: &str) {
        let mut state = self.state.write().await;
        if state.agents.iter().any(|a| a.id == id) {
            state.active_agent_id = Some(id.to_string());
        }
    }

    /// Looks up an agent by id in the current roster.
    pub async fn get_agent(&self, id: &str) -> Option<Agent> {
        self.state
            .read()
            .await
            .agents
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    /// Returns the active agent, if any.
    pub async fn active_agent(&self) -> Option<Agent> {
        let state = self.state.read().await;
        let id = state.active_agent_id.as_deref()?;
        state.agents.iter().find(|a| a.id == id).cloned()
    }

    /// Returns the active agent id, if any.
    pub async fn active_agent_id(&self) -> Option<String> {
        self.state.read().await.active_agent_id.clone()
    }

    /// Returns a snapshot of the sorted roster.
    pub async fn agents(&self) -> Vec<Agent> {
        self.state.read().await.agents.clone()
    }

    /// Clears the roster and active selection.
    pub async fn clear(&self) {
        *self.state.write().await = AgentState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AtelierError;
    use crate::testing::MockApi;

    fn agent(id: &str, order: i32) -> Agent {
        Agent {
            id: id.to_string(),
            name: format!("Agent {id}"),
            role: None,
            model: "atelier-1".to_string(),
            order,
            system_instruction: String::new(),
            summary_instruction: String::new(),
            files: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_sorted_by_order_then_id() {
        let api = Arc::new(MockApi::default());
        api.set_agents(vec![agent("b", 1), agent("a", 1), agent("c", 0)])
            .await;
        let registry = AgentRegistry::new(api);

        registry.load_agents("p1").await.unwrap();

        let ids: Vec<String> = registry.agents().await.into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(registry.active_agent_id().await.as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn test_blank_project_id_clears_without_fetch() {
        let api = Arc::new(MockApi::default());
        api.set_agents(vec![agent("a", 0)]).await;
        let registry = AgentRegistry::new(api.clone());
        registry.load_agents("p1").await.unwrap();

        registry.load_agents("  ").await.unwrap();

        assert!(registry.agents().await.is_empty());
        assert!(registry.active_agent_id().await.is_none());
        assert_eq!(api.calls("list_agents").await, 1);
    }

    #[tokio::test]
    async fn test_previous_selection_kept_when_it_survives() {
        let api = Arc::new(MockApi::default());
        api.set_agents(vec![agent("a", 0), agent("b", 1)]).await;
        let registry = AgentRegistry::new(api.clone());
        registry.load_agents("p1").await.unwrap();
        registry.select_agent("b").await;

        registry.load_agents("p1").await.unwrap();

        assert_eq!(registry.active_agent_id().await.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_select_agent_rejects_unknown_id() {
        let api = Arc::new(MockApi::default());
        api.set_agents(vec![agent("a", 0)]).await;
        let registry = AgentRegistry::new(api);
        registry.load_agents("p1").await.unwrap();

        registry.select_agent("ghost").await;

        assert_eq!(registry.active_agent_id().await.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_load_failure_clears_and_rethrows() {
        let api = Arc::new(MockApi::default());
        api.set_agents(vec![agent("a", 0)]).await;
        let registry = AgentRegistry::new(api.clone());
        registry.load_agents("p1").await.unwrap();

        api.fail_once("list_agents", AtelierError::server(503, "down"))
            .await;
        let err = registry.load_agents("p1").await.unwrap_err();

        assert!(err.is_transient());
        assert!(registry.agents().await.is_empty());
        assert!(registry.active_agent_id().await.is_none());
    }
}
