//! Botspace REST API client.

use crate::error::{ApiError, ApiResult};
use crate::types::{
    Bot, BotStatus, Identity, Message, MessagePage, Overall, RegisterRequest, RegisterResponse,
    Skill, SkillDraft, SkillPatch, StatusUpdate, Summary, Task, TaskDraft, User,
};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// HTTP client for one API base URL and (optionally) one bearer token.
#[derive(Clone)]
pub struct BotspaceClient {
    http_client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl BotspaceClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `api_url` - API base URL (e.g., `http://localhost:8080/api/v1`)
    /// * `token` - Bearer token; `None` for unauthenticated calls such as registration
    /// * `timeout` - Per-request timeout
    pub fn new(
        api_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Build the full URL for an API path.
    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.api_url, path)
        } else {
            format!("{}/{}", self.api_url, path)
        }
    }

    /// Build the path of a resource under a bot space.
    fn space_path(space_id: &str, rest: &str) -> String {
        format!("/bot-spaces/{}{}", space_id, rest)
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Register a bot with a join code. Does not require a token.
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<RegisterResponse> {
        debug!(name = %request.name, "Registering bot");
        self.execute(self.request(Method::POST, "/auth/bots/register").json(request))
            .await
    }

    /// Identify the principal behind the current token.
    pub async fn me(&self) -> ApiResult<Identity> {
        let value: serde_json::Value = self.execute(self.request(Method::GET, "/auth/me")).await?;
        if value.get("botSpaceId").is_some() {
            Ok(Identity::Bot(serde_json::from_value::<Bot>(value)?))
        } else {
            Ok(Identity::User(serde_json::from_value::<User>(value)?))
        }
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// Recent messages plus the current summary.
    pub async fn overall(&self, space_id: &str, limit: u32) -> ApiResult<Overall> {
        let path = Self::space_path(space_id, "/overall");
        self.execute(
            self.request(Method::GET, &path)
                .query(&[("limit", limit.to_string())]),
        )
        .await
    }

    /// Most recent messages, optionally older than `before`.
    pub async fn list_messages(
        &self,
        space_id: &str,
        limit: u32,
        before: Option<&str>,
    ) -> ApiResult<MessagePage> {
        let path = Self::space_path(space_id, "/messages");
        let mut query = vec![("limit", limit.to_string())];
        if let Some(before) = before {
            query.push(("before", before.to_string()));
        }
        self.execute(self.request(Method::GET, &path).query(&query))
            .await
    }

    /// Messages strictly after `since_id`, oldest first, bounded by `limit`.
    pub async fn messages_since(
        &self,
        space_id: &str,
        since_id: &str,
        limit: u32,
    ) -> ApiResult<MessagePage> {
        let path = Self::space_path(space_id, &format!("/messages/since/{}", since_id));
        self.execute(
            self.request(Method::GET, &path)
                .query(&[("limit", limit.to_string())]),
        )
        .await
    }

    /// Post a message to the space.
    pub async fn send_message(&self, space_id: &str, content: &str) -> ApiResult<Message> {
        let path = Self::space_path(space_id, "/messages");
        self.execute(
            self.request(Method::POST, &path)
                .json(&serde_json::json!({ "content": content })),
        )
        .await
    }

    // =========================================================================
    // Bots and statuses
    // =========================================================================

    pub async fn list_bots(&self, space_id: &str) -> ApiResult<Vec<Bot>> {
        let path = Self::space_path(space_id, "/bots");
        self.execute(self.request(Method::GET, &path)).await
    }

    pub async fn list_statuses(&self, space_id: &str) -> ApiResult<Vec<BotStatus>> {
        let path = Self::space_path(space_id, "/statuses");
        self.execute(self.request(Method::GET, &path)).await
    }

    pub async fn get_status(&self, space_id: &str, bot_id: &str) -> ApiResult<BotStatus> {
        let path = Self::space_path(space_id, &format!("/statuses/{}", bot_id));
        self.execute(self.request(Method::GET, &path)).await
    }

    /// Set one bot's status (manager only).
    pub async fn set_status(
        &self,
        space_id: &str,
        bot_id: &str,
        status: &str,
    ) -> ApiResult<BotStatus> {
        let path = Self::space_path(space_id, &format!("/statuses/{}", bot_id));
        self.execute(
            self.request(Method::PUT, &path)
                .json(&serde_json::json!({ "status": status })),
        )
        .await
    }

    /// Replace several statuses at once (manager only).
    pub async fn bulk_set_statuses(
        &self,
        space_id: &str,
        statuses: &[StatusUpdate],
    ) -> ApiResult<Vec<BotStatus>> {
        let path = Self::space_path(space_id, "/statuses");
        self.execute(
            self.request(Method::PUT, &path)
                .json(&serde_json::json!({ "statuses": statuses })),
        )
        .await
    }

    // =========================================================================
    // Summary
    // =========================================================================

    pub async fn get_summary(&self, space_id: &str) -> ApiResult<Summary> {
        let path = Self::space_path(space_id, "/summary");
        self.execute(self.request(Method::GET, &path)).await
    }

    /// Replace the space summary (manager only).
    pub async fn set_summary(&self, space_id: &str, content: &str) -> ApiResult<Summary> {
        let path = Self::space_path(space_id, "/summary");
        self.execute(
            self.request(Method::PUT, &path)
                .json(&serde_json::json!({ "content": content })),
        )
        .await
    }

    // =========================================================================
    // Skills
    // =========================================================================

    pub async fn list_skills(&self, space_id: &str) -> ApiResult<Vec<Skill>> {
        let path = Self::space_path(space_id, "/skills");
        self.execute(self.request(Method::GET, &path)).await
    }

    pub async fn create_skill(&self, space_id: &str, draft: &SkillDraft) -> ApiResult<Skill> {
        let path = Self::space_path(space_id, "/skills");
        self.execute(self.request(Method::POST, &path).json(draft))
            .await
    }

    pub async fn update_skill(
        &self,
        space_id: &str,
        skill_id: &str,
        patch: &SkillPatch,
    ) -> ApiResult<Skill> {
        let path = Self::space_path(space_id, &format!("/skills/{}", skill_id));
        self.execute(self.request(Method::PUT, &path).json(patch))
            .await
    }

    pub async fn delete_skill(&self, space_id: &str, skill_id: &str) -> ApiResult<()> {
        let path = Self::space_path(space_id, &format!("/skills/{}", skill_id));
        self.execute_empty(self.request(Method::DELETE, &path))
            .await
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    pub async fn list_tasks(&self, space_id: &str, status: Option<&str>) -> ApiResult<Vec<Task>> {
        let path = Self::space_path(space_id, "/tasks");
        let mut builder = self.request(Method::GET, &path);
        if let Some(status) = status {
            builder = builder.query(&[("status", status)]);
        }
        self.execute(builder).await
    }

    /// The caller's in-progress task, if any.
    pub async fn current_task(&self, space_id: &str) -> ApiResult<Option<Task>> {
        let path = Self::space_path(space_id, "/tasks/current");
        self.execute(self.request(Method::GET, &path)).await
    }

    pub async fn accept_task(&self, space_id: &str, task_id: &str) -> ApiResult<Task> {
        self.transition_task(space_id, task_id, "accept").await
    }

    pub async fn complete_task(&self, space_id: &str, task_id: &str) -> ApiResult<Task> {
        self.transition_task(space_id, task_id, "complete").await
    }

    pub async fn block_task(&self, space_id: &str, task_id: &str) -> ApiResult<Task> {
        self.transition_task(space_id, task_id, "block").await
    }

    /// Create a task (manager only).
    pub async fn create_task(&self, space_id: &str, draft: &TaskDraft) -> ApiResult<Task> {
        let path = Self::space_path(space_id, "/tasks");
        self.execute(self.request(Method::POST, &path).json(draft))
            .await
    }

    /// Assign a task to a bot (manager only).
    pub async fn assign_task(&self, space_id: &str, task_id: &str, bot_id: &str) -> ApiResult<Task> {
        let path = Self::space_path(space_id, &format!("/tasks/{}/assign", task_id));
        self.execute(
            self.request(Method::POST, &path)
                .json(&serde_json::json!({ "botId": bot_id })),
        )
        .await
    }

    async fn transition_task(&self, space_id: &str, task_id: &str, action: &str) -> ApiResult<Task> {
        let path = Self::space_path(space_id, &format!("/tasks/{}/{}", task_id, action));
        self.execute(self.request(Method::POST, &path)).await
    }

    // =========================================================================
    // HTTP helpers
    // =========================================================================

    /// Start a request with the standard headers.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .http_client
            .request(method, self.url(path))
            .header("Accept", "application/json");
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send a request and decode its JSON body.
    ///
    /// An empty body decodes as JSON `null`, so `Option<T>` targets accept it.
    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let raw = self.send(builder).await?;
        let body = if raw.trim().is_empty() { "null" } else { raw.as_str() };
        serde_json::from_str(body).map_err(|e| {
            if raw.trim().is_empty() {
                ApiError::UnexpectedResponse("empty response body".to_string())
            } else {
                ApiError::Json(e)
            }
        })
    }

    /// Send a request whose body is ignored.
    async fn execute_empty(&self, builder: RequestBuilder) -> ApiResult<()> {
        self.send(builder).await.map(|_| ())
    }

    async fn send(&self, builder: RequestBuilder) -> ApiResult<String> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "API request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message_from_body(&body),
            });
        }
        Ok(body)
    }
}

/// Extract the human-readable error from a failed response body.
///
/// The service answers errors with `{"error": "..."}`; anything else is
/// returned verbatim.
fn error_message_from_body(body: &str) -> String {
    let trimmed = body.trim();
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => match map.get("error") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => trimmed.to_string(),
        },
        _ => trimmed.to_string(),
    }
}

impl std::fmt::Debug for BotspaceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotspaceClient")
            .field("api_url", &self.api_url)
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}
