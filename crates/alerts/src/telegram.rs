//! Raw Telegram Bot API client.
//!
//! Only the two calls the bot needs: `sendMessage` (form POST) and
//! `getUpdates` (short long-poll with an offset cursor). Delivery is
//! best-effort; the caller logs failures and moves on.

use sentiment_core::ChatId;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const TELEGRAM_API: &str = "https://api.telegram.org";

/// Long-poll timeout passed to getUpdates, in seconds.
const UPDATES_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Telegram transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Telegram API error: {0}")]
    Api(String),
}

/// An inbound text message pulled from getUpdates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub update_id: i64,
    pub chat_id: ChatId,
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    #[serde(default)]
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

/// Thin client over the Telegram Bot API.
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Self {
        Self::with_api_url(token, TELEGRAM_API)
    }

    /// Point the client at a different API host (tests).
    pub fn with_api_url(token: &str, api_url: &str) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(UPDATES_TIMEOUT_SECS + 10))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: format!("{}/bot{}", api_url, token),
        }
    }

    /// Send a plain-text message to a chat.
    pub async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), TelegramError> {
        let url = format!("{}/sendMessage", self.base_url);
        let chat_id = chat_id.to_string();
        let params = [("chat_id", chat_id.as_str()), ("text", text)];

        let response = self.http.post(&url).form(&params).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TelegramError::Api(format!("{}: {}", status, body)));
        }
        Ok(())
    }

    /// Fetch inbound messages after `offset`. Updates without a text
    /// message body (stickers, edits, joins) are dropped.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
    ) -> Result<Vec<InboundMessage>, TelegramError> {
        let url = format!("{}/getUpdates", self.base_url);
        let mut query = vec![("timeout", UPDATES_TIMEOUT_SECS.to_string())];
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }

        let response = self.http.get(&url).query(&query).send().await?;
        let payload: UpdatesResponse = response.json().await?;
        if !payload.ok {
            return Err(TelegramError::Api(
                "getUpdates returned ok=false".to_string(),
            ));
        }

        let messages = collect_messages(payload);
        debug!(count = messages.len(), "fetched Telegram updates");
        Ok(messages)
    }
}

fn collect_messages(payload: UpdatesResponse) -> Vec<InboundMessage> {
    payload
        .result
        .into_iter()
        .filter_map(|update| {
            let message = update.message?;
            let text = message.text?;
            Some(InboundMessage {
                update_id: update.update_id,
                chat_id: message.chat.id,
                text,
            })
        })
        .collect()
}

/// Offset to request next so every update seen so far is acknowledged.
/// Telegram redelivers anything before the offset is advanced past it.
pub fn next_offset(messages: &[InboundMessage], current: Option<i64>) -> Option<i64> {
    messages
        .iter()
        .map(|m| m.update_id + 1)
        .chain(current)
        .max()
}
