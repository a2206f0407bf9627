use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageId, MessageRef},
    Result,
};

/// Outbound messenger port.
///
/// Telegram is the only implementation; tests use in-memory fakes.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    /// Send `text` verbatim (no parse mode).
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;

    /// Send Telegram-HTML (bot replies).
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef>;

    /// Duplicate `message_id` from `from_chat_id` into `chat_id`, keeping media.
    ///
    /// `caption` replaces the original caption when set.
    async fn copy_message(
        &self,
        chat_id: ChatId,
        from_chat_id: ChatId,
        message_id: MessageId,
        caption: Option<&str>,
    ) -> Result<MessageRef>;
}
