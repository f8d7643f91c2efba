//! reqwest implementation of [`BackendApi`].
//!
//! Responsibilities beyond plain HTTP:
//! - Re-reads the bearer token from the [`TokenSource`] on every request
//! - Maps status codes onto the error taxonomy
//! - Enforces the global rate-limit block window after a 429
//! - Uses a per-call-class timeout: short administrative calls abort
//!   quickly, calls that invoke a downstream model get a long timeout
//!   since they may legitimately run for minutes

use crate::dto::{
    AgentDto, DocumentDto, MessageDto, ProjectDto, ProjectTypeDto, SendMessageBody,
    UploadFileBody, UserDto, into_domain,
};
use async_trait::async_trait;
use atelier_core::agent::model::Agent;
use atelier_core::api::{BackendApi, TokenSource};
use atelier_core::chat::message::Message;
use atelier_core::document::model::Document;
use atelier_core::error::{AtelierError, Result};
use atelier_core::project::model::{Project, ProjectType};
use atelier_core::session::model::User;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Connection settings for [`RestBackend`].
#[derive(Debug, Clone)]
pub struct RestConfig {
    pub base_url: String,
    /// Timeout for short administrative calls.
    pub request_timeout: Duration,
    /// Timeout for calls that invoke a downstream model.
    pub model_timeout: Duration,
    /// Block window applied after a 429 without a Retry-After header.
    pub rate_limit_cooldown: Duration,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            request_timeout: Duration::from_secs(15),
            model_timeout: Duration::from_secs(300),
            rate_limit_cooldown: Duration::from_secs(30),
        }
    }
}

/// Which timeout a call gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallClass {
    /// Administrative call, aborted client-side on timeout.
    Short,
    /// Invokes a downstream AI model; aborting would discard a result the
    /// server still computes, so the timeout is long.
    Model,
}

pub struct RestBackend {
    config: RestConfig,
    short: Client,
    model: Client,
    tokens: Arc<dyn TokenSource>,
    /// End of the current rate-limit block window, if one is active.
    blocked_until: Mutex<Option<Instant>>,
}

impl RestBackend {
    /// Builds the backend with one HTTP client per call class.
    ///
    /// # Errors
    ///
    /// Returns a config error if either client cannot be constructed.
    pub fn new(config: RestConfig, tokens: Arc<dyn TokenSource>) -> Result<Self> {
        let short = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AtelierError::config(format!("http client: {e}")))?;
        let model = Client::builder()
            .timeout(config.model_timeout)
            .build()
            .map_err(|e| AtelierError::config(format!("http client: {e}")))?;
        Ok(Self {
            config,
            short,
            model,
            tokens,
            blocked_until: Mutex::new(None),
        })
    }

    async fn check_block_window(&self, path: &str) -> Result<()> {
        if is_auth_route(path) {
            return Ok(());
        }
        let mut blocked = self.blocked_until.lock().await;
        match *blocked {
            Some(until) if Instant::now() < until => {
                let remaining = until.saturating_duration_since(Instant::now());
                Err(AtelierError::rate_limit(Some(remaining.as_secs().max(1))))
            }
            Some(_) => {
                *blocked = None;
                Ok(())
            }
            None => Ok(()),
        }
    }

    async fn engage_block_window(&self, retry_after_secs: u64) {
        let until = Instant::now() + Duration::from_secs(retry_after_secs);
        *self.blocked_until.lock().await = Some(until);
        tracing::warn!(retry_after_secs, "rate limited; blocking outbound requests");
    }

    fn builder(&self, class: CallClass, method: Method, path: &str) -> RequestBuilder {
        let client = match class {
            CallClass::Short => &self.short,
            CallClass::Model => &self.model,
        };
        client.request(method, format!("{}{path}", self.config.base_url))
    }

    async fn send(&self, path: &str, mut request: RequestBuilder) -> Result<Response> {
        self.check_block_window(path).await?;
        if let Some(token) = self.tokens.bearer_token().await {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = retry_after_secs(&response);
        let body = response.text().await.unwrap_or_default();
        let err = map_status(status, &body, retry_after);
        if let AtelierError::RateLimit { retry_after_secs } = err {
            self.engage_block_window(
                retry_after_secs.unwrap_or(self.config.rate_limit_cooldown.as_secs()),
            )
            .await;
        }
        Err(err)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let request = self.builder(CallClass::Short, Method::GET, path).query(query);
        let response = self.send(path, request).await?;
        response.json().await.map_err(map_transport_error)
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        class: CallClass,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<T> {
        let request = self
            .builder(class, Method::POST, path)
            .query(query)
            .json(body);
        let response = self.send(path, request).await?;
        response.json().await.map_err(map_transport_error)
    }
}

#[async_trait]
impl BackendApi for RestBackend {
    async fn current_user(&self) -> Result<User> {
        let dto: UserDto = self.get_json("/auth/me", &[]).await?;
        Ok(dto.into())
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let dtos: Vec<ProjectDto> = self.get_json("/projects", &[]).await?;
        Ok(into_domain(dtos))
    }

    async fn list_project_types(&self) -> Result<Vec<ProjectType>> {
        let dtos: Vec<ProjectTypeDto> = self.get_json("/project-types", &[]).await?;
        Ok(into_domain(dtos))
    }

    async fn list_agents(&self, project_id: &str) -> Result<Vec<Agent>> {
        let dtos: Vec<AgentDto> = self
            .get_json("/agents", &[("projectId", project_id)])
            .await?;
        Ok(into_domain(dtos))
    }

    async fn list_messages(&self, agent_id: &str, project_id: &str) -> Result<Vec<Message>> {
        let path = format!("/agents/{agent_id}/messages");
        let dtos: Vec<MessageDto> = self.get_json(&path, &[("projectId", project_id)]).await?;
        Ok(into_domain(dtos))
    }

    async fn send_message(
        &self,
        agent_id: &str,
        project_id: &str,
        text: &str,
    ) -> Result<Vec<Message>> {
        let path = format!("/agents/{agent_id}/messages");
        let body = SendMessageBody { text, project_id };
        let dtos: Vec<MessageDto> = self
            .post_json(CallClass::Model, &path, &[("projectId", project_id)], &body)
            .await?;
        Ok(into_domain(dtos))
    }

    async fn clear_messages(&self, agent_id: &str, project_id: &str) -> Result<()> {
        let path = format!("/agents/{agent_id}/messages");
        let request = self
            .builder(CallClass::Short, Method::DELETE, &path)
            .query(&[("projectId", project_id)]);
        self.send(&path, request).await?;
        Ok(())
    }

    async fn document_summary(&self, agent_id: &str, project_id: &str) -> Result<Vec<Document>> {
        let path = format!("/agents/{agent_id}/files/summary");
        let dtos: Vec<DocumentDto> = self.get_json(&path, &[("projectId", project_id)]).await?;
        Ok(into_domain(dtos))
    }

    async fn generate_summary(&self, agent_id: &str, project_id: &str) -> Result<Document> {
        let path = format!("/agents/{agent_id}/summary");
        let dto: DocumentDto = self
            .post_json(
                CallClass::Model,
                &path,
                &[("projectId", project_id)],
                &serde_json::json!({}),
            )
            .await?;
        Ok(dto.into())
    }

    async fn upload_file(
        &self,
        project_id: &str,
        file_name: &str,
        data: &[u8],
    ) -> Result<Document> {
        let path = format!("/projects/{project_id}/files");
        let mime_type = mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .to_string();
        let content = String::from_utf8_lossy(data);
        let body = UploadFileBody {
            name: file_name,
            mime_type: &mime_type,
            content: content.as_ref(),
        };
        let dto: DocumentDto = self.post_json(CallClass::Short, &path, &[], &body).await?;
        Ok(dto.into())
    }

    async fn delete_file(&self, project_id: &str, file_id: &str) -> Result<()> {
        let path = format!("/projects/{project_id}/files/{file_id}");
        let request = self.builder(CallClass::Short, Method::DELETE, &path);
        self.send(&path, request).await?;
        Ok(())
    }
}

/// Auth routes bypass the rate-limit block window so a user can still log
/// in or refresh their session while other traffic is blocked.
fn is_auth_route(path: &str) -> bool {
    path.starts_with("/auth")
}

fn map_transport_error(err: reqwest::Error) -> AtelierError {
    if err.is_timeout() {
        AtelierError::Timeout
    } else if err.is_decode() {
        AtelierError::Serialization {
            format: "json".to_string(),
            message: err.to_string(),
        }
    } else {
        AtelierError::network(err.to_string())
    }
}

fn retry_after_secs(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

fn map_status(status: StatusCode, body: &str, retry_after: Option<u64>) -> AtelierError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AtelierError::auth(status.as_u16(), extract_message(body))
        }
        StatusCode::TOO_MANY_REQUESTS => AtelierError::rate_limit(retry_after),
        StatusCode::NOT_FOUND => AtelierError::not_found("resource", extract_message(body)),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            AtelierError::validation(flatten_validation(body))
        }
        _ => AtelierError::server(status.as_u16(), extract_message(body)),
    }
}

/// Pulls a human-readable message out of a JSON error body, falling back
/// to the raw text.
fn extract_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| v.get("message").or_else(|| v.get("error")))
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

/// Flattens a structured validation body `{"errors": {"field": ["msg"]}}`
/// into one joined human string. Bodies without that shape fall back to
/// [`extract_message`].
fn flatten_validation(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let Some(errors) = parsed.as_ref().and_then(|v| v.get("errors")).and_then(|e| e.as_object())
    else {
        return extract_message(body);
    };

    let mut parts = Vec::new();
    for (field, messages) in errors {
        match messages.as_array() {
            Some(list) => {
                for message in list.iter().filter_map(|m| m.as_str()) {
                    parts.push(format!("{field}: {message}"));
                }
            }
            None => {
                if let Some(message) = messages.as_str() {
                    parts.push(format!("{field}: {message}"));
                }
            }
        }
    }
    if parts.is_empty() {
        extract_message(body)
    } else {
        parts.join("; ")
    }
}
