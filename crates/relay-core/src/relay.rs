//! Source → target relay pipeline.
//!
//! Per message: ignore foreign chats, drop blocked ids, rewrite with one
//! snapshot of the rules, then either send the rewritten text or copy the
//! original (media intact) when nothing printable is left.

use std::sync::Arc;

use crate::{
    config::Config,
    domain::MessageRef,
    errors::Error,
    messaging::{port::MessagingPort, types::InboundMessage},
    replace::apply_rules,
    store::{BlockList, RuleSet, RuleStore},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Not from the source chat.
    Ignored,
    /// Id is on the block list; nothing was dispatched.
    Dropped,
    /// Rewritten text was sent as a new message.
    Sent(MessageRef),
    /// The original was copied into the target chat.
    Copied(MessageRef),
}

pub struct RelayPipeline {
    cfg: Arc<Config>,
    store: Arc<RuleStore>,
    messenger: Arc<dyn MessagingPort>,
}

impl RelayPipeline {
    pub fn new(cfg: Arc<Config>, store: Arc<RuleStore>, messenger: Arc<dyn MessagingPort>) -> Self {
        Self {
            cfg,
            store,
            messenger,
        }
    }

    /// Relay one inbound message. Only dispatch failures are returned as errors.
    pub async fn relay(&self, msg: &InboundMessage) -> Result<RelayOutcome> {
        if msg.chat_id != self.cfg.source_chat_id {
            return Ok(RelayOutcome::Ignored);
        }

        if self.block_list().await.contains(msg.id) {
            tracing::info!(message_id = %msg.id, "blocked message ignored");
            return Ok(RelayOutcome::Dropped);
        }

        let rules = self.rules().await.merged();
        let rewritten = apply_rules(msg.body(), &rules);

        let target = self.cfg.target_chat_id;
        if !rewritten.trim().is_empty() {
            let sent = self
                .messenger
                .send_text(target, &rewritten)
                .await
                .map_err(dispatch_error)?;
            tracing::info!(message_id = %msg.id, "relayed rewritten text");
            return Ok(RelayOutcome::Sent(sent));
        }

        let caption = msg.shape.supports_caption().then_some(rewritten.as_str());
        let copied = self
            .messenger
            .copy_message(target, msg.chat_id, msg.id, caption)
            .await
            .map_err(dispatch_error)?;
        tracing::info!(message_id = %msg.id, "copied original message");
        Ok(RelayOutcome::Copied(copied))
    }

    async fn block_list(&self) -> BlockList {
        self.store.get_block_list().await.unwrap_or_else(|e| {
            tracing::warn!("block list unavailable, relaying unfiltered: {e}");
            BlockList::default()
        })
    }

    async fn rules(&self) -> RuleSet {
        self.store.get_rules().await.unwrap_or_else(|e| {
            tracing::warn!("replacement rules unavailable, relaying unchanged: {e}");
            RuleSet::default()
        })
    }
}

fn dispatch_error(e: Error) -> Error {
    match e {
        Error::Dispatch(_) => e,
        other => Error::Dispatch(other.to_string()),
    }
}
