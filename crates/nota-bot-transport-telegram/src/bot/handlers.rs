use anyhow::{anyhow, Result};
use nota_bot_core::dialogue::{DialogueEngine, Outcome};
use teloxide::{prelude::*, types::ChatId, utils::command::BotCommands};
use tracing::{debug, info};

/// Text that opens the main menu
const MENU_TRIGGER: &str = "list bot";

/// Supported commands for the bot
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// First contact: show the main menu
    #[command(description = "Show the main menu.")]
    Start,
}

/// Session key of a Telegram chat.
#[must_use]
pub fn sender_from_chat(chat_id: ChatId) -> String {
    chat_id.0.to_string()
}

/// Parses a session key back into a Telegram chat id.
///
/// # Errors
///
/// Returns an error if `sender` is not a chat id produced by
/// [`sender_from_chat`].
pub fn chat_id_from_sender(sender: &str) -> Result<ChatId> {
    sender
        .parse::<i64>()
        .map(ChatId)
        .map_err(|e| anyhow!("Invalid Telegram sender {sender:?}: {e}"))
}

// Helper function to get user name from Message
fn get_user_name(msg: &Message) -> String {
    if let Some(ref user) = msg.from {
        if let Some(ref username) = user.username {
            return username.clone();
        }
        if !user.first_name.is_empty() {
            return user.first_name.clone();
        }
    }
    "Unknown".to_string()
}

/// Handles `/start` by opening the main menu.
///
/// # Errors
///
/// Currently infallible; replies are delivered by the engine's transport.
pub async fn start(msg: &Message, engine: &DialogueEngine) -> Result<()> {
    let sender = sender_from_chat(msg.chat.id);
    info!(sender = %sender, user = %get_user_name(msg), "New conversation started");
    engine.handle_message(&sender, MENU_TRIGGER).await;
    Ok(())
}

/// Routes a text message through the dialogue engine.
///
/// # Errors
///
/// Currently infallible; non-text messages are skipped.
pub async fn handle_text(msg: &Message, engine: &DialogueEngine) -> Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let sender = sender_from_chat(msg.chat.id);

    match engine.handle_message(&sender, text).await {
        Outcome::Handled(intent) => debug!(sender = %sender, %intent, "Message handled"),
        Outcome::Ignored => debug!(sender = %sender, "Message ignored"),
        Outcome::Rejected(intent, e) => {
            debug!(sender = %sender, %intent, error = %e, "Message rejected");
        }
    }
    Ok(())
}
