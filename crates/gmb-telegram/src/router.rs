use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use gmb_core::{
    config::Config,
    handlers::HandlerContext,
    messaging::{port::MessagingPort, types::IncomingUpdate},
    router::Router,
    scheduler::PeriodicScheduler,
};

use crate::handlers;
use crate::TelegramMessenger;

pub struct AppState {
    pub router: Arc<Router>,
    /// Used to ignore commands addressed to other bots in the group.
    pub bot_username: Option<String>,
}

/// Run the bot until interrupted (ctrl-c).
///
/// The rules scheduler is armed before polling starts and its ticks go
/// through the same router as Telegram updates.
pub async fn run_polling(cfg: Arc<Config>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    let bot_username = match bot.get_me().await {
        Ok(me) => {
            tracing::info!(username = %me.username(), "bot started");
            Some(me.username().to_string())
        }
        Err(e) => {
            tracing::warn!("get_me failed, continuing without own username: {e}");
            None
        }
    };
    tracing::info!(target_chat_id = cfg.target_chat_id.0, "managing group");

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let router = Arc::new(Router::standard(HandlerContext {
        cfg: cfg.clone(),
        messenger,
    })?);
    for (pattern, handler) in router.routes() {
        tracing::debug!(%pattern, ?handler, "route registered");
    }

    let scheduler = PeriodicScheduler::new();
    let tick_router = router.clone();
    scheduler
        .start(cfg.rules_schedule.clone(), move |tick| {
            let router = tick_router.clone();
            async move {
                router.dispatch(&IncomingUpdate::Tick(tick)).await;
            }
        })
        .await;

    let state = Arc::new(AppState {
        router,
        bot_username,
    });

    let handler =
        dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    tracing::info!("dispatcher stopped, shutting down");
    scheduler.shutdown().await;
    Ok(())
}
