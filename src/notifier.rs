use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::Recipient;
use teloxide::RequestError;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use crate::config::Config;

#[derive(Debug, Error)]
#[error("failed to deliver message to chat {chat}: {source}")]
pub struct DeliveryError {
    pub chat: String,
    #[source]
    pub source: RequestError,
}

/// Delivery of a text message to the single configured chat.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<(), DeliveryError>;
}

#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
    chat: Recipient,
}

impl TelegramNotifier {
    pub fn new(bot: Bot, chat: Recipient) -> Self {
        Self { bot, chat }
    }

    pub fn from_config(cfg: &Config) -> Self {
        let bot = Bot::new(cfg.secrets.telegram_token.clone());
        Self::new(bot, parse_recipient(&cfg.secrets.telegram_chat_id))
    }
}

/// Numeric ids address chats directly, anything else is a channel username.
pub fn parse_recipient(chat_id: &str) -> Recipient {
    let chat_id = chat_id.trim();
    match chat_id.parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) => Recipient::ChannelUsername(chat_id.to_string()),
    }
}

fn describe(chat: &Recipient) -> String {
    match chat {
        Recipient::Id(id) => id.0.to_string(),
        Recipient::ChannelUsername(name) => name.clone(),
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    #[instrument(skip_all)]
    async fn notify(&self, message: &str) -> Result<(), DeliveryError> {
        let chat = describe(&self.chat);
        debug!(%chat, "sending message");
        match self.bot.send_message(self.chat.clone(), message).await {
            Ok(_) => {
                info!(%chat, "message sent");
                Ok(())
            }
            Err(source) => {
                error!(?source, %chat, "failed to send message");
                Err(DeliveryError { chat, source })
            }
        }
    }
}
