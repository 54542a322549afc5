use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::types::TextStyle,
    Result,
};

/// Outbound side of the messenger.
///
/// Calls are single attempts: implementations must not retry or throttle.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str, style: TextStyle)
        -> Result<MessageRef>;

    async fn delete_message(&self, msg: MessageRef) -> Result<()>;
}
