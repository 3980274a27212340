//! Resilient messaging utilities with automatic retry for Telegram API operations.
//!
//! Wraps outgoing sends in exponential backoff with jitter so transient
//! network failures don't drop replies. This only covers the chat transport;
//! invoice gateway calls are never retried.

use crate::config::{
    TELEGRAM_API_INITIAL_BACKOFF_MS, TELEGRAM_API_MAX_BACKOFF_MS, TELEGRAM_API_MAX_RETRIES,
};
use anyhow::Result;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, Message, ParseMode};
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;
use tracing::warn;

/// Retries a Telegram operation with exponential backoff.
///
/// - Initial delay: 500ms
/// - Max delay: 4s
/// - Max attempts: 3 retries after the first call
///
/// # Errors
///
/// Returns the last error if all attempts fail.
pub async fn retry_telegram_operation<F, Fut, T>(operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let retry_strategy = ExponentialBackoff::from_millis(TELEGRAM_API_INITIAL_BACKOFF_MS)
        .max_delay(Duration::from_millis(TELEGRAM_API_MAX_BACKOFF_MS))
        .map(jitter)
        .take(TELEGRAM_API_MAX_RETRIES);

    Retry::spawn(retry_strategy, operation).await.map_err(|e| {
        warn!(
            "Telegram API operation failed after {} retries: {}",
            TELEGRAM_API_MAX_RETRIES, e
        );
        e
    })
}

/// Send an HTML message with automatic retry on network failures.
///
/// # Errors
///
/// Returns an error after all retries are exhausted.
pub async fn send_html_resilient(
    bot: &Bot,
    chat_id: ChatId,
    html: impl Into<String>,
) -> Result<Message> {
    let html = html.into();
    retry_telegram_operation(|| async {
        bot.send_message(chat_id, html.clone())
            .parse_mode(ParseMode::Html)
            .await
            .map_err(|e| anyhow::anyhow!("Telegram send error: {e}"))
    })
    .await
}

/// Send an in-memory photo with an HTML caption, retrying on failures.
///
/// # Errors
///
/// Returns an error after all retries are exhausted.
pub async fn send_photo_resilient(
    bot: &Bot,
    chat_id: ChatId,
    bytes: &[u8],
    file_name: &str,
    caption_html: &str,
) -> Result<Message> {
    retry_telegram_operation(|| async {
        let photo = InputFile::memory(bytes.to_vec()).file_name(file_name.to_string());
        bot.send_photo(chat_id, photo)
            .caption(caption_html.to_string())
            .parse_mode(ParseMode::Html)
            .await
            .map_err(|e| anyhow::anyhow!("Telegram photo error: {e}"))
    })
    .await
}
