use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::parser::{Announcement, ChannelId, MessageId};

/// A message the relay sent or rewrote downstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub channel: ChannelId,
    pub message_id: MessageId,
    pub text: String,
    pub edited: bool,
}

/// Chat network the relay reads announcements from and publishes to
#[async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &str;

    /// Next announcement, new or edited. `Ok(None)` once the feed is closed.
    async fn receive(&mut self) -> Result<Option<Announcement>>;

    /// Post a message and return its id
    async fn send_message(&self, channel: ChannelId, text: &str) -> Result<MessageId>;

    async fn edit_message(
        &self,
        channel: ChannelId,
        message_id: MessageId,
        text: &str,
    ) -> Result<()>;
}
