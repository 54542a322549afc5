//! Test doubles shared by the unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{
    config::Config,
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    handlers::HandlerContext,
    messaging::{port::MessagingPort, types::TextStyle},
    scheduler::RepeatingJob,
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Send {
        chat_id: ChatId,
        text: String,
        style: TextStyle,
    },
    Delete {
        chat_id: ChatId,
        message_id: MessageId,
    },
}

/// Records every outbound call; optionally fails all of them after recording.
#[derive(Default)]
pub struct RecordingMessenger {
    calls: Mutex<Vec<Call>>,
    fail: bool,
}

impl RecordingMessenger {
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<usize> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        if self.fail {
            return Err(Error::External("telegram error: chat not found".to_string()));
        }
        Ok(calls.len())
    }
}

#[async_trait]
impl MessagingPort for RecordingMessenger {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        style: TextStyle,
    ) -> Result<MessageRef> {
        let n = self.record(Call::Send {
            chat_id,
            text: text.to_string(),
            style,
        })?;
        Ok(MessageRef {
            chat_id,
            message_id: MessageId(n as i32),
        })
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        self.record(Call::Delete {
            chat_id: msg.chat_id,
            message_id: msg.message_id,
        })?;
        Ok(())
    }
}

pub fn context(target_chat_id: ChatId, messenger: Arc<RecordingMessenger>) -> HandlerContext {
    HandlerContext {
        cfg: Arc::new(Config {
            telegram_bot_token: "test-token".to_string(),
            target_chat_id,
            rules_schedule: RepeatingJob::rules(),
        }),
        messenger,
    }
}
