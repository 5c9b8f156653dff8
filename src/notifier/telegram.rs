use std::{fmt, time::Duration};

use serde::Serialize;

use crate::{NotificationError, notifier::Notifier};

pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";
/// Upper bound on a single `sendMessage` call, so a hung request cannot stall the monitor.
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Sends alerts through the Telegram Bot API `sendMessage` method.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    endpoint: String,
    chat_id: String,
}

impl TelegramNotifier {
    /// Create a notifier for `chat_id` using the public Bot API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(bot_token: &str, chat_id: impl Into<String>) -> Result<Self, NotificationError> {
        Self::with_api_base(DEFAULT_TELEGRAM_API, bot_token, chat_id, DEFAULT_NOTIFY_TIMEOUT)
    }

    /// Create a notifier against a custom Bot API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_api_base(
        api_base: &str,
        bot_token: &str,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let endpoint = format!("{}/bot{bot_token}/sendMessage", api_base.trim_end_matches('/'));
        Ok(Self { client, endpoint, chat_id: chat_id.into() })
    }
}

// The endpoint embeds the bot token.
impl fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("endpoint", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotificationError> {
        let body = SendMessage { chat_id: &self.chat_id, text: message };
        let response = self.client.post(&self.endpoint).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::Status(status));
        }
        trace!(status = %status, "Telegram message sent");
        Ok(())
    }
}
