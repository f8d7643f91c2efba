//! Durable local preference port.
//!
//! Registries persist small pieces of state (auth token, last-used project,
//! onboarding markers, form drafts) through this port instead of touching
//! storage directly, so the core logic is testable without a filesystem.
//! All operations are best-effort: reads degrade to `None` and never throw.

use crate::error::Result;
use async_trait::async_trait;

/// An abstract key/value store for durable local preferences.
///
/// Implementations should tolerate out-of-band writes to the underlying
/// storage: callers re-read keys defensively rather than caching values.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Reads a value. Missing keys and storage failures both yield `None`.
    async fn get(&self, key: &str) -> Option<String>;

    /// Writes a value, creating the key if necessary.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes a key. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Well-known preference keys.
///
/// The core itself reads only `AUTH_TOKEN` and `LAST_PROJECT`. The
/// remaining keys belong to UI callers (onboarding progress, list
/// filters, admin form drafts) that persist through the same store; they
/// are declared here so every consumer agrees on the names.
pub mod keys {
    /// Bearer token for the authenticated session.
    pub const AUTH_TOKEN: &str = "auth_token";
    /// Last-used project id, restored and revalidated on bootstrap.
    pub const LAST_PROJECT: &str = "last_project_id";
    /// Comma-separated ids of completed onboarding steps.
    pub const ONBOARDING_COMPLETED: &str = "onboarding_completed_steps";
    /// Comma-separated ids of dismissed onboarding steps.
    pub const ONBOARDING_DISMISSED: &str = "onboarding_dismissed_steps";
    /// Saved filter/sort preferences for the agent list.
    pub const AGENT_LIST_PREFS: &str = "agent_list_prefs";

    /// Key for an unsaved admin form draft, scoped to one agent.
    pub fn agent_draft(agent_id: &str) -> String {
        format!("draft.agent.{agent_id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_draft_key_is_scoped() {
        assert_eq!(keys::agent_draft("a1"), "draft.agent.a1");
        assert_ne!(keys::agent_draft("a1"), keys::agent_draft("a2"));
    }
}
