//! Configuration and settings management
//!
//! Loads settings from config files and environment variables and defines
//! the defaults used by the dialogue collaborators.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default base URL of the remote invoicing API
pub const DEFAULT_INVOICE_API_BASE_URL: &str = "https://app.invyti.com/api";
/// Default timeout for a single gateway HTTP call
pub const DEFAULT_GATEWAY_HTTP_TIMEOUT_SECS: u64 = 30;
/// Default location of the command journal
pub const DEFAULT_JOURNAL_PATH: &str = "logs/bot.log";

/// Path of the nota rendering endpoint, relative to the API base URL
pub const GENERATE_NOTA_ENDPOINT: &str = "generate-nota";
/// Path of the transaction saving endpoint, relative to the API base URL
pub const SAVE_TRANSACTION_ENDPOINT: &str = "save-transaksi";

/// MIME type of rendered notas
pub const NOTA_MIME_TYPE: &str = "image/png";
/// File name attached to rendered notas
pub const NOTA_FILE_NAME: &str = "nota.png";

/// Builds the layered configuration source shared by all settings structs.
///
/// # Errors
///
/// Returns a `ConfigError` if a present config file cannot be parsed.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Local overrides, never checked into git
        .add_source(File::with_name("config/local").required(false))
        // Eg.. `APP__JOURNAL_PATH=/tmp/bot.log ./target/app`
        .add_source(Environment::with_prefix("APP").separator("__"))
        // Plain UPPER_SNAKE_CASE variables; empty values count as unset
        .add_source(Environment::default().ignore_empty(true))
        .build()
}

/// Core settings: where the invoicing API lives and where the journal goes
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CoreSettings {
    /// Base URL of the invoicing API, without trailing slash
    #[serde(default = "default_invoice_api_base_url")]
    pub invoice_api_base_url: String,

    /// Timeout for each gateway HTTP call, in seconds
    #[serde(default = "default_gateway_http_timeout_secs")]
    pub gateway_http_timeout_secs: u64,

    /// Command journal file
    #[serde(default = "default_journal_path")]
    pub journal_path: PathBuf,
}

fn default_invoice_api_base_url() -> String {
    DEFAULT_INVOICE_API_BASE_URL.to_string()
}

const fn default_gateway_http_timeout_secs() -> u64 {
    DEFAULT_GATEWAY_HTTP_TIMEOUT_SECS
}

fn default_journal_path() -> PathBuf {
    PathBuf::from(DEFAULT_JOURNAL_PATH)
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            invoice_api_base_url: default_invoice_api_base_url(),
            gateway_http_timeout_secs: default_gateway_http_timeout_secs(),
            journal_path: default_journal_path(),
        }
    }
}

impl CoreSettings {
    /// Create new settings by loading from environment and files
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use nota_bot_core::config::CoreSettings;
    ///
    /// let settings = CoreSettings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        build_config()?.try_deserialize()
    }

    /// Full URL of an API endpoint
    #[must_use]
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.invoice_api_base_url.trim_end_matches('/'),
            endpoint
        )
    }

    /// Gateway HTTP timeout as a `Duration`
    #[must_use]
    pub const fn gateway_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway_http_timeout_secs)
    }
}
