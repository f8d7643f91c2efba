//! Wire DTOs for the backend's camelCase JSON, converted into domain types.

use atelier_core::agent::model::Agent;
use atelier_core::chat::message::{Message, MessageKind, MessageRole};
use atelier_core::document::model::Document;
use atelier_core::project::model::{Project, ProjectType};
use atelier_core::session::model::User;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct UserDto {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl From<UserDto> for User {
    fn from(dto: UserDto) -> Self {
        User {
            id: dto.id,
            email: dto.email,
            name: dto.name,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub project_type_id: String,
    #[serde(default)]
    pub agent_count: u32,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl From<ProjectDto> for Project {
    fn from(dto: ProjectDto) -> Self {
        Project {
            id: dto.id,
            name: dto.name,
            description: dto.description,
            project_type_id: dto.project_type_id,
            agent_count: dto.agent_count,
            created_at: dto.created_at,
            updated_at: dto.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProjectTypeDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<ProjectTypeDto> for ProjectType {
    fn from(dto: ProjectTypeDto) -> Self {
        ProjectType {
            id: dto.id,
            name: dto.name,
            description: dto.description,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    pub model: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub system_instruction: String,
    #[serde(default)]
    pub summary_instruction: String,
    #[serde(default)]
    pub files: Vec<String>,
}

impl From<AgentDto> for Agent {
    fn from(dto: AgentDto) -> Self {
        Agent {
            id: dto.id,
            name: dto.name,
            role: dto.role,
            model: dto.model,
            order: dto.order,
            system_instruction: dto.system_instruction,
            summary_instruction: dto.summary_instruction,
            files: dto.files,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MessageDto {
    pub id: String,
    pub role: String,
    pub text: String,
    #[serde(default)]
    pub timestamp: String,
}

impl From<MessageDto> for Message {
    fn from(dto: MessageDto) -> Self {
        // Anything the server returns is persisted by definition.
        Message {
            id: dto.id,
            role: if dto.role.eq_ignore_ascii_case("user") {
                MessageRole::User
            } else {
                MessageRole::Model
            },
            text: dto.text,
            timestamp: dto.timestamp,
            kind: MessageKind::Persisted,
            is_error: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub is_knowledge_base: bool,
}

impl From<DocumentDto> for Document {
    fn from(dto: DocumentDto) -> Self {
        Document {
            id: dto.id,
            name: dto.name,
            mime_type: dto.mime_type,
            content: dto.content,
            agent_id: dto.agent_id,
            is_knowledge_base: dto.is_knowledge_base,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageBody<'a> {
    pub text: &'a str,
    pub project_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileBody<'a> {
    pub name: &'a str,
    pub mime_type: &'a str,
    pub content: &'a str,
}

pub fn into_domain<D, T: From<D>>(dtos: Vec<D>) -> Vec<T> {
    dtos.into_iter().map(T::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_parsing_is_case_insensitive() {
        let dto = MessageDto {
            id: "m1".to_string(),
            role: "USER".to_string(),
            text: "hi".to_string(),
            timestamp: String::new(),
        };
        let message = Message::from(dto);
        assert_eq!(message.role, MessageRole::User);
        assert_eq!(message.kind, MessageKind::Persisted);
    }

    #[test]
    fn test_agent_dto_tolerates_missing_optional_fields() {
        let agent: AgentDto =
            serde_json::from_str(r#"{"id":"a1","name":"A","model":"atelier-1"}"#).unwrap();
        assert_eq!(agent.order, 0);
        assert!(agent.files.is_empty());
    }

    #[test]
    fn test_document_dto_camel_case_fields() {
        let doc: DocumentDto = serde_json::from_str(
            r#"{"id":"d1","name":"notes.md","mimeType":"text/markdown","isKnowledgeBase":true}"#,
        )
        .unwrap();
        assert_eq!(doc.mime_type, "text/markdown");
        assert!(doc.is_knowledge_base);
    }
}
