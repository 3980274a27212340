//! Outbound transport interface.
//!
//! Implemented by chat adapters (Telegram in this workspace). Senders are
//! opaque strings chosen by the adapter.

use anyhow::Result;
use async_trait::async_trait;

/// A media attachment sent to a sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMedia {
    /// Raw file content
    pub bytes: Vec<u8>,
    /// MIME type, e.g. `image/png`
    pub mime_type: String,
    /// File name shown to the recipient
    pub file_name: String,
    /// Caption sent with the media
    pub caption: String,
}

/// Delivers replies and media to senders
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a text reply
    async fn reply(&self, sender: &str, text: &str) -> Result<()>;

    /// Send a media attachment with caption
    async fn send_media(&self, sender: &str, media: &OutgoingMedia) -> Result<()>;
}
