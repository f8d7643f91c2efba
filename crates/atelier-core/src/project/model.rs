//! Project domain models.

use serde::{Deserialize, Serialize};

/// A user-owned project grouping agents and shared documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique project identifier
    pub id: String,
    /// Human-readable project name
    pub name: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// Id of the project type this project was created from
    pub project_type_id: String,
    /// Number of agents in the project (server-computed)
    pub agent_count: u32,
    /// Timestamp when the project was created (ISO 8601 format)
    pub created_at: String,
    /// Timestamp when the project was last updated (ISO 8601 format)
    pub updated_at: String,
}

/// A template category a project is created from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectType {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}
