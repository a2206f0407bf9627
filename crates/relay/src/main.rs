use std::sync::Arc;

use relay_core::{config::Config, store::RuleStore};

#[tokio::main]
async fn main() -> Result<(), relay_core::Error> {
    relay_core::logging::init("relay")?;

    let cfg = match Config::load() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            tracing::error!("{e}");
            return Err(e);
        }
    };

    let store = Arc::new(RuleStore::new(&cfg));
    store.ensure_documents().await;

    relay_telegram::router::run_polling(cfg, store)
        .await
        .map_err(|e| relay_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
