//! Backend API port.
//!
//! Defines the REST collaborator surface the core consumes, decoupled from
//! the HTTP implementation in `atelier-client`. Every suspension point in
//! the core's state machines is a call through this trait.

use crate::agent::model::Agent;
use crate::chat::message::Message;
use crate::document::model::Document;
use crate::error::Result;
use crate::project::model::{Project, ProjectType};
use crate::session::model::User;
use async_trait::async_trait;

/// Source of the current bearer token.
///
/// The token is re-read on every request build to tolerate out-of-band
/// writes to durable storage (e.g. a login completing in another window).
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn bearer_token(&self) -> Option<String>;
}

/// The remote backend consumed by the core components.
///
/// # Implementation Notes
///
/// Implementations are responsible for:
/// - Attaching the bearer token to every request
/// - Mapping HTTP failures onto the [`crate::error::AtelierError`] taxonomy
/// - The global rate-limit block window after a 429
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Fetches the authenticated user. Bootstrap step 1.
    async fn current_user(&self) -> Result<User>;

    /// Lists all projects owned by the current user.
    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// Lists the available project types.
    async fn list_project_types(&self) -> Result<Vec<ProjectType>>;

    /// Lists the agents of one project. `project_id` must be non-blank.
    async fn list_agents(&self, project_id: &str) -> Result<Vec<Agent>>;

    /// Fetches the stored conversation history for one agent.
    async fn list_messages(&self, agent_id: &str, project_id: &str) -> Result<Vec<Message>>;

    /// Sends a user message and returns every message the server persisted
    /// for the exchange, in server order.
    async fn send_message(
        &self,
        agent_id: &str,
        project_id: &str,
        text: &str,
    ) -> Result<Vec<Message>>;

    /// Deletes the stored conversation history for one agent.
    async fn clear_messages(&self, agent_id: &str, project_id: &str) -> Result<()>;

    /// Fetches the project-scoped document list.
    ///
    /// A backend 404 surfaces as [`crate::error::AtelierError::NotFound`];
    /// the document cache interprets it as "zero documents".
    async fn document_summary(&self, agent_id: &str, project_id: &str) -> Result<Vec<Document>>;

    /// Asks the backend to generate a new summary document.
    async fn generate_summary(&self, agent_id: &str, project_id: &str) -> Result<Document>;

    /// Uploads a file into the project's shared document pool.
    async fn upload_file(
        &self,
        project_id: &str,
        file_name: &str,
        data: &[u8],
    ) -> Result<Document>;

    /// Deletes a project file by id.
    async fn delete_file(&self, project_id: &str, file_id: &str) -> Result<()>;
}
