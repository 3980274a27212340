use dotenvy::dotenv;
use nota_bot_core::config::CoreSettings;
use nota_bot_transport_telegram::config::{BotSettings, TelegramSettings};
use nota_bot_transport_telegram::runner::run_bot;
use regex::Regex;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Default log filter when neither `RUST_LOG` nor `DEBUG_MODE` is set
const DEFAULT_LOG_FILTER: &str = "nota_bot_core=info,nota_bot_transport_telegram=info,\
nota_bot_telegram=info,teloxide=info,hyper=warn,h2=error,reqwest=warn";

/// Masks Telegram bot tokens in log output.
///
/// teloxide and reqwest errors embed the full API URL, token included.
struct TokenRedactor {
    rules: Vec<(Regex, &'static str)>,
}

impl TokenRedactor {
    fn new() -> Result<Self, regex::Error> {
        let rules = [
            // https://api.telegram.org/bot<token>/method
            (r"(https?://[^/]+/bot)[0-9]+:[A-Za-z0-9_-]+", "${1}[TELEGRAM_TOKEN]"),
            // bot<token> outside a URL
            (r"(bot[0-9]{8,10}:)[A-Za-z0-9_-]+", "${1}[TELEGRAM_TOKEN]"),
            // bare <id>:<35 char secret>
            (r"\b[0-9]{8,10}:[A-Za-z0-9_-]{35}\b", "[TELEGRAM_TOKEN]"),
        ];
        let rules = rules
            .into_iter()
            .map(|(pattern, replacement)| Regex::new(pattern).map(|re| (re, replacement)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    fn redact(&self, line: &str) -> String {
        self.rules
            .iter()
            .fold(line.to_string(), |acc, (re, replacement)| {
                re.replace_all(&acc, *replacement).into_owned()
            })
    }
}

/// Writer that redacts each formatted event before passing it on
struct RedactedWriter<W: Write> {
    inner: W,
    redactor: Arc<TokenRedactor>,
}

impl<W: Write> Write for RedactedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let line = self.redactor.redact(&String::from_utf8_lossy(buf));
        self.inner.write_all(line.as_bytes())?;
        // Callers track progress against their own buffer
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn debug_mode() -> bool {
    matches!(
        std::env::var("DEBUG_MODE").as_deref(),
        Ok("true" | "1")
    )
}

fn init_logging(redactor: Arc<TokenRedactor>) {
    let fallback = if debug_mode() { "debug" } else { DEFAULT_LOG_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let make_writer = move || RedactedWriter {
        inner: io::stderr(),
        redactor: redactor.clone(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(make_writer))
        .init();
}

fn load_settings() -> Result<BotSettings, config::ConfigError> {
    let core = CoreSettings::new()?;
    let telegram = TelegramSettings::new()?;
    Ok(BotSettings::new(core, telegram))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let redactor = Arc::new(TokenRedactor::new().inspect_err(|e| {
        eprintln!("Failed to compile redaction patterns: {e}");
    })?);
    init_logging(redactor);

    info!("Starting Mustari Tani nota bot...");

    let settings = match load_settings() {
        Ok(settings) => Arc::new(settings),
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        journal = %settings.core.journal_path.display(),
        "Configuration loaded successfully."
    );

    run_bot(settings).await;

    Ok(())
}
