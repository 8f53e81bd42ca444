//! Telegram notifier: message delivery and the recipient allow-list.
//!
//! The agent only ever talks to the chats named in its configuration.
//! Delivery failures are reported to the caller, which logs and moves
//! on; the pipeline never retries a notification.

use crate::config::TelegramConfig;
use serde::{Deserialize, Serialize};

/// Notifier error types.
#[derive(Debug)]
pub enum NotifyError {
    /// Recipient is not configured (e.g. no roommate chat id)
    NoRecipient(String),
    /// Network/HTTP error
    Network(String),
    /// Bot API rejected the request
    Server { status: u16, message: String },
}

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotifyError::NoRecipient(who) => write!(f, "no {who} chat id configured"),
            NotifyError::Network(msg) => write!(f, "notify network error: {msg}"),
            NotifyError::Server { status, message } => {
                write!(f, "notify server error ({status}): {message}")
            }
        }
    }
}

impl std::error::Error for NotifyError {}

/// sendMessage request body.
#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'a str,
}

/// Minimal sendMessage response envelope.
#[derive(Debug, Deserialize)]
struct SendResult {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram bot client addressing the configured recipients.
pub struct Notifier {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl Notifier {
    pub fn new(config: TelegramConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// The sendMessage endpoint URL.
    pub fn send_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_url, self.config.bot_token
        )
    }

    /// Allow-list lookup: is this chat permitted to issue commands?
    pub fn is_authorized(&self, chat_id: i64) -> bool {
        chat_id == self.config.owner_chat_id || Some(chat_id) == self.config.roommate_chat_id
    }

    /// Send a message to the owner chat.
    pub async fn notify_owner(&self, text: &str) -> Result<(), NotifyError> {
        self.send(self.config.owner_chat_id, text).await
    }

    /// Send a message to the roommate chat, if one is configured.
    pub async fn notify_roommate(&self, text: &str) -> Result<(), NotifyError> {
        let chat_id = self
            .config
            .roommate_chat_id
            .ok_or_else(|| NotifyError::NoRecipient("roommate".to_string()))?;
        self.send(chat_id, text).await
    }

    /// Deliver one HTML-formatted message to a chat.
    pub async fn send(&self, chat_id: i64, text: &str) -> Result<(), NotifyError> {
        let body = SendMessage {
            chat_id,
            text,
            parse_mode: "HTML",
        };

        let response = self
            .client
            .post(self.send_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(NotifyError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let result: SendResult = response
            .json()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;
        if !result.ok {
            return Err(NotifyError::Server {
                status: status.as_u16(),
                message: result.description.unwrap_or_default(),
            });
        }

        Ok(())
    }
}
