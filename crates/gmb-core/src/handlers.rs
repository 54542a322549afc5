//! The bot's reactions. Each handler issues at most one outbound call and
//! never retries; transport failures are logged and dropped.

use std::sync::Arc;

use crate::{
    config::Config,
    domain::MessageRef,
    formatting::render_markup,
    messaging::{
        port::MessagingPort,
        types::{Command, MembersJoined, TextStyle},
    },
    Result,
};

pub const GREETING: &str = "I'm your group manager bot!";

/// Broadcast to the managed group on every rules tick. Rendered from markup before sending.
pub const RULES_MESSAGE: &str = "📜 **Group Rules** 📜
1. Be respectful.
2. No spam.
3. Stay on topic.";

/// Read-only state shared by every handler invocation.
#[derive(Clone)]
pub struct HandlerContext {
    pub cfg: Arc<Config>,
    pub messenger: Arc<dyn MessagingPort>,
}

/// Reply to `/start` in the chat it came from.
pub async fn start(ctx: &HandlerContext, cmd: &Command) -> Result<()> {
    ctx.messenger
        .send_text(cmd.chat_id, GREETING, TextStyle::Plain)
        .await?;
    tracing::info!(chat_id = cmd.chat_id.0, "greeted");
    Ok(())
}

/// Remove a "members joined" service message.
///
/// Every join notice is removed, re-joins included. A failed delete (most
/// commonly: the message is already gone) counts as done.
pub async fn delete_join_notice(ctx: &HandlerContext, joined: &MembersJoined) -> Result<()> {
    if joined.member_ids.is_empty() {
        return Ok(());
    }

    let msg = MessageRef {
        chat_id: joined.chat_id,
        message_id: joined.message_id,
    };
    match ctx.messenger.delete_message(msg).await {
        Ok(()) => tracing::info!(
            chat_id = msg.chat_id.0,
            message_id = msg.message_id.0,
            members = joined.member_ids.len(),
            "deleted join notice"
        ),
        Err(e) => tracing::debug!(
            chat_id = msg.chat_id.0,
            message_id = msg.message_id.0,
            "join notice not deleted: {e}"
        ),
    }
    Ok(())
}

pub async fn broadcast_rules(ctx: &HandlerContext) -> Result<()> {
    let chat_id = ctx.cfg.target_chat_id;
    ctx.messenger
        .send_text(chat_id, &render_markup(RULES_MESSAGE), TextStyle::Html)
        .await?;
    tracing::info!(chat_id = chat_id.0, "rules broadcast sent");
    Ok(())
}
