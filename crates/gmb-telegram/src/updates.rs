//! Telegram `Message` → core `IncomingUpdate`.

use teloxide::types::Message;

use gmb_core::{
    domain::{ChatId, MessageId, UserId},
    messaging::types::{Command, IncomingUpdate, MembersJoined, TextMessage},
};

/// Map a message into the core update model. Returns `None` for messages the
/// bot has no use for (media, other service messages).
pub fn from_message(msg: &Message, bot_username: Option<&str>) -> Option<IncomingUpdate> {
    let chat_id = ChatId(msg.chat.id.0);
    let message_id = MessageId(msg.id.0);

    if let Some(members) = msg.new_chat_members() {
        return Some(IncomingUpdate::MembersJoined(MembersJoined {
            chat_id,
            message_id,
            member_ids: members.iter().map(|u| UserId(u.id.0 as i64)).collect(),
        }));
    }

    let text = msg.text()?;
    let user_id = msg.from().map(|u| UserId(u.id.0 as i64));
    Some(classify_text(
        chat_id,
        message_id,
        user_id,
        text,
        bot_username,
    ))
}

pub fn classify_text(
    chat_id: ChatId,
    message_id: MessageId,
    user_id: Option<UserId>,
    text: &str,
    bot_username: Option<&str>,
) -> IncomingUpdate {
    match parse_command(text) {
        Some(cmd) if cmd.is_addressed_to(bot_username) => IncomingUpdate::Command(Command {
            chat_id,
            user_id,
            name: cmd.name,
            args: cmd.args.to_string(),
        }),
        _ => IncomingUpdate::Text(TextMessage {
            chat_id,
            message_id,
            text: text.to_string(),
        }),
    }
}

#[derive(Debug, PartialEq, Eq)]
struct ParsedCommand<'a> {
    name: String,
    mention: Option<&'a str>,
    args: &'a str,
}

impl ParsedCommand<'_> {
    /// Group members may address another bot with `/start@other_bot`.
    fn is_addressed_to(&self, bot_username: Option<&str>) -> bool {
        match (self.mention, bot_username) {
            (Some(mention), Some(me)) => mention.eq_ignore_ascii_case(me),
            _ => true,
        }
    }
}

// Telegram sends `/cmd@botname arg1 ...`.
fn parse_command(text: &str) -> Option<ParsedCommand<'_>> {
    let text = text.trim();
    let rest = text.strip_prefix('/')?;
    let (head, args) = match rest.split_once(char::is_whitespace) {
        Some((head, args)) => (head, args.trim()),
        None => (rest, ""),
    };
    let (name, mention) = match head.split_once('@') {
        Some((name, mention)) => (name, Some(mention)),
        None => (head, None),
    };
    if name.is_empty() {
        return None;
    }

    Some(ParsedCommand {
        name: name.to_lowercase(),
        mention,
        args,
    })
}
