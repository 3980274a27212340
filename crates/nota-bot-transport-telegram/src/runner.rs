use crate::bot;
use crate::bot::handlers::Command;
use crate::bot::TelegramTransport;
use crate::config::BotSettings;
use nota_bot_core::dialogue::DialogueEngine;
use nota_bot_core::gateway::HttpInvoiceGateway;
use nota_bot_core::journal::{Category, FileJournal, Journal, TracingJournal, SYSTEM_SENDER};
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use tracing::{error, info, warn};

/// Run the Telegram transport runtime until Ctrl-C.
///
/// Sessions live in memory only; everything in progress is lost on exit.
pub async fn run_bot(settings: Arc<BotSettings>) {
    let journal = init_journal(&settings).await;
    journal
        .record(Category::System, SYSTEM_SENDER, "Bot initialization started")
        .await;

    let gateway = Arc::new(HttpInvoiceGateway::new(settings.core.as_ref()));
    info!(
        base_url = %settings.core.invoice_api_base_url,
        timeout_secs = settings.core.gateway_http_timeout_secs,
        "Invoice gateway initialized."
    );

    let bot = Bot::new(settings.telegram.telegram_token.clone());
    let transport = Arc::new(TelegramTransport::new(bot.clone()));
    let engine = Arc::new(DialogueEngine::new(gateway, transport, journal.clone()));
    let handler = setup_handler();

    info!("Bot is running...");
    journal
        .record(Category::System, SYSTEM_SENDER, "Bot is running")
        .await;

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![engine, settings])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    warn!("Bot stopped; in-progress orders are discarded.");
    journal
        .record(
            Category::System,
            SYSTEM_SENDER,
            "Bot stopped, in-memory sessions discarded",
        )
        .await;
}

async fn init_journal(settings: &BotSettings) -> Arc<dyn Journal> {
    match FileJournal::open(settings.core.journal_path.clone()).await {
        Ok(journal) => {
            info!(path = %journal.path().display(), "Command journal initialized.");
            Arc::new(journal)
        }
        Err(e) => {
            error!(
                "Failed to open command journal at {}: {}. Falling back to log output.",
                settings.core.journal_path.display(),
                e
            );
            Arc::new(TracingJournal)
        }
    }
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(dptree::filter(|msg: Message| msg.text().is_some()).endpoint(handle_text))
}

async fn handle_command(
    msg: Message,
    cmd: Command,
    engine: Arc<DialogueEngine>,
) -> Result<(), teloxide::RequestError> {
    let res = match cmd {
        Command::Start => bot::handlers::start(&msg, &engine).await,
    };
    if let Err(e) = res {
        error!("Command error: {}", e);
    }
    respond(())
}

async fn handle_text(
    msg: Message,
    engine: Arc<DialogueEngine>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = bot::handlers::handle_text(&msg, &engine).await {
        error!("Text handler error: {}", e);
    }
    respond(())
}
