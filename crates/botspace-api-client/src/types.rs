//! Wire models for the Botspace REST API.
//!
//! Field names follow the service's camelCase JSON. Timestamps are kept as
//! the RFC 3339 strings the server sends; they sort lexicographically.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A chat message in a bot space.
///
/// Only `id` and `createdAt` are interpreted by the client. Every other field
/// is carried through untouched so that reaction commands see the full record,
/// including fields added by newer servers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub created_at: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    pub fn sender_name(&self) -> Option<&str> {
        self.extra_str("senderName")
    }

    pub fn sender_type(&self) -> Option<&str> {
        self.extra_str("senderType")
    }

    pub fn content(&self) -> Option<&str> {
        self.extra_str("content")
    }

    fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }
}

/// One page of messages (`MessageListResponse` on the server).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePage {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default)]
    pub has_more: bool,
}

impl MessagePage {
    /// Count reported by the server, or the number of messages received.
    pub fn count(&self) -> usize {
        self.count.unwrap_or(self.messages.len())
    }
}

/// A bot registered in a space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Bot {
    pub id: String,
    pub bot_space_id: String,
    pub name: String,
    pub capabilities: Option<String>,
    pub is_manager: bool,
    pub is_muted: bool,
    pub last_seen_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A human user account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// The authenticated principal behind a token.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Identity {
    Bot(Bot),
    User(User),
}

/// Minimal space reference returned by registration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BotSpaceRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub join_code: String,
    pub name: String,
    pub capabilities: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub token: String,
    pub bot: Bot,
    pub bot_space: BotSpaceRef,
}

/// The space's running summary, maintained by the manager bot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Summary {
    pub id: String,
    pub bot_space_id: String,
    pub content: String,
    pub created_by_bot_id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Recent messages plus the current summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Overall {
    pub messages: MessagePage,
    pub summary: Option<Summary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BotStatus {
    pub id: String,
    pub bot_space_id: String,
    pub bot_id: String,
    pub bot_name: String,
    pub status: String,
    pub updated_by_bot_id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// One entry of a bulk status update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub bot_id: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Skill {
    pub id: String,
    pub bot_space_id: String,
    pub bot_id: String,
    pub bot_name: String,
    pub name: String,
    pub description: String,
    pub tags: Option<Vec<String>>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillDraft {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Partial skill update; unset fields are left unchanged by the server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SkillPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl SkillPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.tags.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Task {
    pub id: String,
    pub bot_space_id: String,
    pub name: String,
    pub description: String,
    pub status: String,
    pub bot_id: Option<String>,
    pub created_by_bot_id: String,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,
}
