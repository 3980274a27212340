/// WhatsApp-style markup to Telegram HTML conversion
pub mod format;
/// Command and message handlers
pub mod handlers;
/// Resilient messaging with retry
pub mod resilient;
/// [`nota_bot_core::transport::Transport`] implementation
pub mod transport;

pub use transport::TelegramTransport;
