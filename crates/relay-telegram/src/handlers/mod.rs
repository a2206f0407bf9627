//! Telegram update handlers.
//!
//! Source-chat messages go to the relay pipeline; `/commands` anywhere else go
//! to the admin handler, which stays silent for unauthorized senders.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use relay_core::{domain::ChatId, messaging::types::Command};

use crate::router::AppState;

mod commands;
mod relay;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if ChatId(msg.chat.id.0) == state.cfg.source_chat_id {
        return relay::handle_relay(msg, state).await;
    }

    if let Some(cmd) = msg.text().and_then(Command::parse) {
        return commands::handle_command(msg, cmd, state).await;
    }

    Ok(())
}
