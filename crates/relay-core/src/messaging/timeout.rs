use std::{future::Future, sync::Arc, time::Duration};

use crate::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::port::MessagingPort,
    Result,
};

/// MessagingPort decorator that bounds every outbound call.
///
/// A call that does not finish within `limit` is abandoned and reported as
/// `Error::Dispatch`. Nothing is retried.
pub struct TimeoutMessenger {
    inner: Arc<dyn MessagingPort>,
    limit: Duration,
}

impl TimeoutMessenger {
    pub fn new(inner: Arc<dyn MessagingPort>, limit: Duration) -> Self {
        Self { inner, limit }
    }

    async fn bounded<T>(&self, op: &str, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.limit, fut).await {
            Ok(res) => res,
            Err(_) => Err(Error::Dispatch(format!(
                "{op} timed out after {}ms",
                self.limit.as_millis()
            ))),
        }
    }
}

#[async_trait::async_trait]
impl MessagingPort for TimeoutMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        self.bounded("send_text", self.inner.send_text(chat_id, text))
            .await
    }

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
        self.bounded("send_html", self.inner.send_html(chat_id, html))
            .await
    }

    async fn copy_message(
        &self,
        chat_id: ChatId,
        from_chat_id: ChatId,
        message_id: MessageId,
        caption: Option<&str>,
    ) -> Result<MessageRef> {
        self.bounded(
            "copy_message",
            self.inner
                .copy_message(chat_id, from_chat_id, message_id, caption),
        )
        .await
    }
}
