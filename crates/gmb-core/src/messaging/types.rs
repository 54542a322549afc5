use crate::domain::{ChatId, MessageId, UserId};

/// Inbound update model, produced by the adapter (or the scheduler for ticks)
/// and consumed immediately by the router.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IncomingUpdate {
    Command(Command),
    MembersJoined(MembersJoined),
    Text(TextMessage),
    Tick(Tick),
}

impl IncomingUpdate {
    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            IncomingUpdate::Command(_) => "command",
            IncomingUpdate::MembersJoined(_) => "members-joined",
            IncomingUpdate::Text(_) => "text",
            IncomingUpdate::Tick(_) => "tick",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub chat_id: ChatId,
    pub user_id: Option<UserId>,
    /// Lower-cased, without the leading `/` or `@botname` suffix.
    pub name: String,
    pub args: String,
}

/// A service message announcing that members were added to (or joined) a chat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MembersJoined {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub member_ids: Vec<UserId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub text: String,
}

/// Synthetic update injected by the periodic scheduler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tick {
    pub job: String,
    /// Zero-based slot index: this tick was due at `start + seq * interval`.
    pub seq: u64,
}

/// How the messenger should interpret outgoing text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextStyle {
    Plain,
    /// Telegram's HTML subset (`<b>`, `<i>`, `<code>`, `<a>`).
    Html,
}
