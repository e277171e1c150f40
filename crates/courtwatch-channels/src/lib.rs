//! # CourtWatch Channels
//! Outbound notification sinks.

pub mod telegram;
pub mod webhook;

use courtwatch_core::config::WatchConfig;
use courtwatch_core::traits::Channel;

/// Build the configured notification channel, if any.
///
/// Telegram wins when both sinks are configured.
pub fn create_channel(config: &WatchConfig) -> Option<Box<dyn Channel>> {
    if let Some(tg) = &config.telegram {
        return Some(Box::new(telegram::TelegramChannel::new(tg.clone())));
    }
    if let Some(hook) = &config.webhook {
        return Some(Box::new(webhook::WebhookChannel::new(hook.clone())));
    }
    tracing::debug!("No notification channel configured");
    None
}
