use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::config::TelegramConfig;

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API returned {status}: {body}")]
    Api { status: u16, body: String },
}

/// Bot API client used for operator alerts and command replies.
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    api_base: String,
    bot_token: String,
    admin_chat_id: i64,
}

impl TelegramClient {
    pub fn new(api_base: impl Into<String>, bot_token: impl Into<String>, admin_chat_id: i64) -> Self {
        Self {
            http: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            admin_chat_id,
        }
    }

    /// `None` when the bot token is not available.
    pub fn from_config(config: &TelegramConfig) -> Option<Self> {
        config
            .get_bot_token()
            .map(|token| Self::new(config.api_base.clone(), token, config.admin_chat_id))
    }

    pub fn admin_chat_id(&self) -> i64 {
        self.admin_chat_id
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);
        let chat_id = chat_id.to_string();
        let params = [
            ("chat_id", chat_id.as_str()),
            ("text", text),
            ("parse_mode", "HTML"),
        ];

        let response = self.http.post(&url).form(&params).send().await?;

        if response.status().is_success() {
            debug!("Telegram message delivered to chat {}", chat_id);
            Ok(())
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(TelegramError::Api { status, body })
        }
    }

    pub async fn notify_admin(&self, text: &str) -> Result<(), TelegramError> {
        self.send_message(self.admin_chat_id, text).await
    }
}
