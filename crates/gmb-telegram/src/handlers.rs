//! Teloxide endpoints. They only translate; routing and reactions live in `gmb-core`.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use crate::router::AppState;
use crate::updates::from_message;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(update) = from_message(&msg, state.bot_username.as_deref()) else {
        return Ok(());
    };

    // Failures are logged by the router; nothing is reported back to the chat.
    let outcome = state.router.dispatch(&update).await;
    tracing::debug!(chat_id = msg.chat.id.0, kind = update.kind(), ?outcome, "dispatched");
    Ok(())
}
