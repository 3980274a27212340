use crate::bot::format::to_telegram_html;
use crate::bot::handlers::chat_id_from_sender;
use crate::bot::resilient::{send_html_resilient, send_photo_resilient};
use anyhow::Result;
use async_trait::async_trait;
use nota_bot_core::transport::{OutgoingMedia, Transport};
use teloxide::prelude::*;
use tracing::debug;

/// Telegram implementation of the outbound transport.
///
/// Senders are Telegram chat ids rendered as strings.
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    /// Create a transport sending through `bot`.
    #[must_use]
    pub const fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn reply(&self, sender: &str, text: &str) -> Result<()> {
        let chat_id = chat_id_from_sender(sender)?;
        send_html_resilient(&self.bot, chat_id, to_telegram_html(text)).await?;
        Ok(())
    }

    async fn send_media(&self, sender: &str, media: &OutgoingMedia) -> Result<()> {
        let chat_id = chat_id_from_sender(sender)?;
        debug!(
            sender = %sender,
            mime_type = %media.mime_type,
            size = media.bytes.len(),
            "Sending media"
        );
        send_photo_resilient(
            &self.bot,
            chat_id,
            &media.bytes,
            &media.file_name,
            &to_telegram_html(&media.caption),
        )
        .await?;
        Ok(())
    }
}
