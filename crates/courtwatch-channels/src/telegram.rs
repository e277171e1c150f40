//! Telegram Bot channel: sends notifications through the Bot API.

use async_trait::async_trait;
use courtwatch_core::config::TelegramConfig;
use courtwatch_core::error::{CourtWatchError, Result};
use courtwatch_core::traits::Channel;
use std::time::Duration;

/// Telegram rejects messages longer than this many characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

pub struct TelegramChannel {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(config: TelegramConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    /// Send a single message (must fit Telegram's size limit).
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_url.trim_end_matches('/'),
            self.config.bot_token
        );
        let body = serde_json::json!({
            "chat_id": self.config.chat_id,
            "text": text,
        });

        let response = self.client.post(&url).json(&body).send().await
            // reqwest errors embed the URL, which carries the bot token
            .map_err(|e| CourtWatchError::channel(format!("Telegram send failed: {}", e.without_url())))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(CourtWatchError::channel(format!("Telegram {status}: {text}")));
        }
        Ok(())
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str { "telegram" }

    async fn send(&self, text: &str) -> Result<()> {
        let chunks = split_message(text, MAX_MESSAGE_CHARS);
        let total = chunks.len();
        for (i, chunk) in chunks.iter().enumerate() {
            self.send_message(chunk).await?;
            tracing::debug!("Telegram message {}/{} sent", i + 1, total);
        }
        Ok(())
    }
}

/// Split `text` into pieces of at most `max_chars` characters, breaking on
/// line boundaries where possible.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len > max_chars {
            // A single oversized line gets hard-wrapped.
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }
        current.push_str(line);
        current_len += line_len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
