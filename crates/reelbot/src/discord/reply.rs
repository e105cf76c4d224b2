use async_trait::async_trait;
use reelcore::workflow::ReplySink;
use reelcore::{AppError, AppResult};
use serenity::builder::CreateMessage;
use serenity::http::Http;
use serenity::model::channel::Message;
use serenity::model::id::{ChannelId, MessageId};
use std::sync::Arc;

/// Sends workflow replies as Discord replies to the triggering message.
pub struct MessageReply {
    http: Arc<Http>,
    channel_id: ChannelId,
    message_id: MessageId,
}

impl MessageReply {
    pub fn new(http: Arc<Http>, msg: &Message) -> Self {
        Self {
            http,
            channel_id: msg.channel_id,
            message_id: msg.id,
        }
    }
}

#[async_trait]
impl ReplySink for MessageReply {
    async fn reply(&self, text: &str) -> AppResult<()> {
        let builder = CreateMessage::new()
            .content(text)
            .reference_message((self.channel_id, self.message_id));
        self.channel_id
            .send_message(&self.http, builder)
            .await
            .map_err(|e| AppError::Anyhow(e.into()))?;
        Ok(())
    }
}
