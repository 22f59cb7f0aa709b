//! Channel sender implementations
//!
//! A channel sender delivers a direct message to a platform account
//! reference. Senders are opaque and fallible; the dispatcher treats every
//! attempt independently. The Telegram sender ships here; a Discord sender
//! is provided by the front-end that owns the Discord connection.

use futures::future::BoxFuture;
use teloxide::{Bot, types::ChatId, requests::Requester, prelude::Request};

use crate::models::Platform;
use crate::utils::errors::{TaskBuddyError, Result};

/// Direct-message delivery over one platform.
pub trait ChannelSender: Send + Sync {
    fn platform(&self) -> Platform;

    /// Send `text` to the account behind `account_id`. Errors are the
    /// caller's to log; they must never take down sibling attempts.
    fn send_direct_message<'a>(&'a self, account_id: &'a str, text: &'a str) -> BoxFuture<'a, Result<()>>;
}

/// Telegram delivery via the bot API. Account references are chat ids in
/// decimal form.
#[derive(Clone)]
pub struct TelegramSender {
    bot: Bot,
}

impl TelegramSender {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

impl ChannelSender for TelegramSender {
    fn platform(&self) -> Platform {
        Platform::Telegram
    }

    fn send_direct_message<'a>(&'a self, account_id: &'a str, text: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let chat_id: i64 = account_id.parse().map_err(|_| {
                TaskBuddyError::InvalidInput(format!("not a Telegram chat id: {}", account_id))
            })?;

            self.bot.send_message(ChatId(chat_id), text).send().await?;
            Ok(())
        })
    }
}
