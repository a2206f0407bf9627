use std::sync::Arc;

use teloxide::prelude::*;

use relay_core::{
    domain::{ChatId, UserId},
    messaging::types::Command,
};

use crate::router::AppState;

pub async fn handle_command(
    msg: Message,
    cmd: Command,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let sender = msg.from().map(|u| UserId(u.id.0 as i64));

    let Some(reply) = state.admin.handle(sender, &cmd.name, &cmd.args).await else {
        return Ok(());
    };

    if let Err(e) = state
        .messenger
        .send_html(ChatId(msg.chat.id.0), &reply)
        .await
    {
        tracing::warn!(command = %cmd.name, "failed to send command reply: {e}");
    }

    Ok(())
}
