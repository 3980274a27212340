//! Telegram transport settings.

use config::ConfigError;
use nota_bot_core::config::CoreSettings;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Telegram transport settings loaded from environment variables.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TelegramSettings {
    /// Telegram Bot API token.
    pub telegram_token: String,
}

impl TelegramSettings {
    /// Create new settings by loading from environment and files.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or the token is missing.
    pub fn new() -> Result<Self, ConfigError> {
        let settings: Self = nota_bot_core::config::build_config()?.try_deserialize()?;
        if settings.telegram_token.trim().is_empty() {
            return Err(ConfigError::NotFound("telegram_token".to_string()));
        }
        Ok(settings)
    }
}

/// Combined settings used by the Telegram transport layer.
#[derive(Clone)]
pub struct BotSettings {
    /// Core settings shared across handlers.
    pub core: Arc<CoreSettings>,
    /// Telegram-specific settings.
    pub telegram: Arc<TelegramSettings>,
}

impl BotSettings {
    /// Create a new combined settings bundle.
    #[must_use]
    pub fn new(core: CoreSettings, telegram: TelegramSettings) -> Self {
        Self {
            core: Arc::new(core),
            telegram: Arc::new(telegram),
        }
    }
}

/// Initial delay before retrying a failed Telegram API call.
pub const TELEGRAM_API_INITIAL_BACKOFF_MS: u64 = 500;
/// Upper bound for the retry delay.
pub const TELEGRAM_API_MAX_BACKOFF_MS: u64 = 4000;
/// Maximum number of retries for one Telegram API call.
pub const TELEGRAM_API_MAX_RETRIES: usize = 3;
