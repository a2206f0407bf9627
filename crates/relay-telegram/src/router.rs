use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use relay_core::{
    admin::AdminCommands,
    config::Config,
    messaging::{port::MessagingPort, timeout::TimeoutMessenger},
    relay::RelayPipeline,
    store::RuleStore,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub pipeline: Arc<RelayPipeline>,
    pub admin: Arc<AdminCommands>,
    pub messenger: Arc<dyn MessagingPort>,
}

impl AppState {
    pub fn new(cfg: Arc<Config>, store: Arc<RuleStore>, messenger: Arc<dyn MessagingPort>) -> Self {
        Self {
            pipeline: Arc::new(RelayPipeline::new(
                cfg.clone(),
                store.clone(),
                messenger.clone(),
            )),
            admin: Arc::new(AdminCommands::new(&cfg, store)),
            messenger,
            cfg,
        }
    }
}

pub async fn run_polling(cfg: Arc<Config>, store: Arc<RuleStore>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.bot_token.clone());

    // Basic startup info.
    match bot.get_me().await {
        Ok(me) => tracing::info!("relay bot started: @{}", me.username()),
        Err(e) => tracing::warn!("could not fetch bot identity: {e}"),
    }
    tracing::info!(
        source = cfg.source_chat_id.0,
        target = cfg.target_chat_id.0,
        admins = cfg.authorized_admins().len(),
        "relaying"
    );

    // Every outbound call is bounded; the Telegram adapter itself only retries 429s.
    let raw_messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let messenger: Arc<dyn MessagingPort> =
        Arc::new(TimeoutMessenger::new(raw_messenger, cfg.dispatch_timeout));

    let state = Arc::new(AppState::new(cfg, store, messenger));

    // Sources are usually channels, which arrive as channel posts.
    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handlers::handle_message))
        .branch(Update::filter_channel_post().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
