//! Page fetching seam between the drain loop and the HTTP client.

use async_trait::async_trait;
use botspace_api_client::{ApiResult, BotspaceClient, MessagePage};

/// One bounded query against a message feed.
///
/// Implementations make no ordering promise for the messages of a page; the
/// drain loop sorts them itself.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// The most recent `limit` messages.
    async fn fetch_recent(&self, limit: u32) -> ApiResult<MessagePage>;

    /// Messages strictly after `cursor`, at most `limit`, with `has_more` set
    /// when further backlog remains.
    async fn fetch_since(&self, cursor: &str, limit: u32) -> ApiResult<MessagePage>;
}

/// The message feed of one bot space.
#[derive(Debug, Clone)]
pub struct SpaceFeed {
    client: BotspaceClient,
    space_id: String,
}

impl SpaceFeed {
    pub fn new(client: BotspaceClient, space_id: impl Into<String>) -> Self {
        Self {
            client,
            space_id: space_id.into(),
        }
    }

    pub fn space_id(&self) -> &str {
        &self.space_id
    }
}

#[async_trait]
impl PageFetcher for SpaceFeed {
    async fn fetch_recent(&self, limit: u32) -> ApiResult<MessagePage> {
        self.client.list_messages(&self.space_id, limit, None).await
    }

    async fn fetch_since(&self, cursor: &str, limit: u32) -> ApiResult<MessagePage> {
        self.client
            .messages_since(&self.space_id, cursor, limit)
            .await
    }
}
