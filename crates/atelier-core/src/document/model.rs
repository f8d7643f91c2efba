//! Document types.

use serde::{Deserialize, Serialize};

/// A document in a project's shared pool.
///
/// Documents are scoped to the project, not to a single agent; `agent_id`
/// records provenance (which agent generated a summary), not ownership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub content: String,
    /// The agent that produced this document, if it was generated.
    #[serde(default)]
    pub agent_id: Option<String>,
    /// Administrator-managed documents, exempt from ordinary user deletion.
    #[serde(default)]
    pub is_knowledge_base: bool,
}

/// Cache key for a project's document pool.
///
/// One key per project: every agent in a project shares the same document
/// list, so switching agents never invalidates or re-fetches it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey(String);

impl DocumentKey {
    pub fn for_project(project_id: &str) -> Self {
        Self(project_id.to_string())
    }

    pub fn project_id(&self) -> &str {
        &self.0
    }
}
