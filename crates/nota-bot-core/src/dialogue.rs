//! Dialogue engine
//!
//! Per-sender order-taking state machine. Each inbound message is
//! classified, checked against the sender's session and answered through the
//! [`Transport`]. Messages from one sender are handled strictly one at a
//! time; different senders never wait on each other.
//!
//! Checkout is a two-step saga (save the transaction, then render its nota)
//! without compensation: a failed step stops the saga, reports the failure
//! and leaves the session in place so the user can send `tidak` again.

use crate::classifier::{classify_normalized, normalize, Intent};
use crate::config::{NOTA_FILE_NAME, NOTA_MIME_TYPE};
use crate::gateway::{GatewayError, InvoiceGateway, NotaImage};
use crate::journal::{Category, Journal};
use crate::parser::{parse_customer, parse_item, parse_print_nota};
use crate::replies;
use crate::session::{Order, Session, SessionStore, Step};
use crate::transport::{OutgoingMedia, Transport};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Session state a command depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// Items need customer data first
    CustomerData,
    /// Checkout needs an order in progress
    ActiveOrder,
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CustomerData => f.write_str("customer data required"),
            Self::ActiveOrder => f.write_str("no active order"),
        }
    }
}

/// Remote call that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStep {
    /// Rendering an existing nota for `print nota`
    PrintNota,
    /// Checkout step 1
    SaveTransaction,
    /// Checkout step 2
    GenerateNota,
}

impl fmt::Display for RemoteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrintNota => f.write_str("print nota"),
            Self::SaveTransaction => f.write_str("save transaction"),
            Self::GenerateNota => f.write_str("generate nota"),
        }
    }
}

/// Errors surfaced to the user as replies; none of them are fatal
#[derive(Debug, Error)]
pub enum DialogueError {
    /// Input does not follow the expected command format
    #[error("Malformed command")]
    MalformedCommand,
    /// Command requires session state the sender doesn't have
    #[error("Missing precondition: {0}")]
    MissingPrecondition(Precondition),
    /// Invoice gateway call failed
    #[error("Remote call failed during {step}: {source}")]
    RemoteCall {
        /// Which call failed
        step: RemoteStep,
        /// Underlying gateway error
        #[source]
        source: GatewayError,
    },
    /// Nota image could not be delivered to the sender
    #[error("Nota delivery failed during {step}: {reason}")]
    Delivery {
        /// Flow the nota belonged to
        step: RemoteStep,
        /// Transport failure message
        reason: String,
    },
}

impl DialogueError {
    /// Reply sent to the user for this error
    #[must_use]
    pub fn reply_text(&self) -> &'static str {
        match self {
            Self::MalformedCommand => replies::PRINT_FORMAT_ERROR,
            Self::MissingPrecondition(Precondition::CustomerData) => {
                replies::CUSTOMER_DATA_FIRST
            }
            Self::MissingPrecondition(Precondition::ActiveOrder) => {
                replies::NO_ACTIVE_TRANSACTION
            }
            Self::RemoteCall {
                step: RemoteStep::PrintNota,
                ..
            }
            | Self::Delivery {
                step: RemoteStep::PrintNota,
                ..
            } => replies::PRINT_FAILED,
            Self::RemoteCall { .. } | Self::Delivery { .. } => replies::SAVE_FAILED,
        }
    }

    fn journal_category(&self) -> Category {
        match self {
            Self::RemoteCall { .. } | Self::Delivery { .. } => Category::Error,
            Self::MalformedCommand | Self::MissingPrecondition(_) => Category::Bot,
        }
    }
}

/// Result of handling one inbound message
#[derive(Debug)]
pub enum Outcome {
    /// The message was acted on
    Handled(Intent),
    /// The message was not a command (or a menu choice outside the menu)
    Ignored,
    /// The command failed; the user got the error reply
    Rejected(Intent, DialogueError),
}

/// The order-taking state machine
pub struct DialogueEngine {
    sessions: SessionStore,
    sender_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    gateway: Arc<dyn InvoiceGateway>,
    transport: Arc<dyn Transport>,
    journal: Arc<dyn Journal>,
}

impl DialogueEngine {
    /// Create an engine with an empty session store
    #[must_use]
    pub fn new(
        gateway: Arc<dyn InvoiceGateway>,
        transport: Arc<dyn Transport>,
        journal: Arc<dyn Journal>,
    ) -> Self {
        Self {
            sessions: SessionStore::new(),
            sender_locks: Mutex::new(HashMap::new()),
            gateway,
            transport,
            journal,
        }
    }

    /// Sessions currently in progress
    #[must_use]
    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handle one inbound message from `sender`.
    ///
    /// Waits for any earlier message of the same sender to finish first.
    pub async fn handle_message(&self, sender: &str, raw_text: &str) -> Outcome {
        let lock = self.sender_lock(sender).await;
        let turn = lock.lock().await;
        let outcome = self.handle_turn(sender, raw_text).await;
        drop(turn);

        self.release_sender_lock(sender, &lock).await;
        outcome
    }

    async fn handle_turn(&self, sender: &str, raw_text: &str) -> Outcome {
        let text = raw_text.trim();
        let normalized = normalize(text);
        let intent = classify_normalized(&normalized);

        self.journal
            .record(Category::Inbox, sender, &format!("Message received: {text}"))
            .await;
        if intent.is_command(&normalized) {
            self.journal.record(Category::User, sender, text).await;
        }

        let session = self.sessions.get(sender).await;
        let in_menu = session.as_ref().map(Session::step) == Some(Step::Menu);
        debug!(sender = %sender, %intent, step = ?session.as_ref().map(Session::step), "Dispatching message");

        let result = match intent {
            Intent::Menu => self.show_menu(sender).await,
            Intent::PrintDirect => self.print_direct(sender, text).await,
            Intent::MenuChoicePrint if in_menu => {
                self.close_menu(sender, replies::PRINT_INSTRUCTIONS, "print nota")
                    .await
            }
            Intent::MenuChoiceCreate if in_menu => {
                self.close_menu(sender, replies::CUSTOMER_DATA_FORMAT, "create nota")
                    .await
            }
            Intent::CustomerData => self.accept_customer(sender, text).await,
            Intent::ItemEntry => self.add_item(sender, text).await,
            Intent::Finalize => self.checkout(sender, session).await,
            Intent::MenuChoicePrint | Intent::MenuChoiceCreate | Intent::Unrecognized => {
                self.journal
                    .record(Category::Info, sender, "Unrecognized message, ignored")
                    .await;
                return Outcome::Ignored;
            }
        };

        match result {
            Ok(()) => Outcome::Handled(intent),
            Err(e) => {
                self.journal
                    .record(e.journal_category(), sender, &e.to_string())
                    .await;
                if e.journal_category() == Category::Error {
                    warn!(sender = %sender, %intent, error = %e, "Command failed");
                } else {
                    info!(sender = %sender, %intent, error = %e, "Command rejected");
                }
                self.reply(sender, e.reply_text()).await;
                Outcome::Rejected(intent, e)
            }
        }
    }

    async fn show_menu(&self, sender: &str) -> Result<(), DialogueError> {
        self.journal
            .record(Category::Bot, sender, "Showing main menu")
            .await;
        self.reply(sender, replies::MAIN_MENU).await;
        self.sessions.set(sender, Session::Menu).await;
        Ok(())
    }

    async fn close_menu(
        &self,
        sender: &str,
        reply: &str,
        choice: &str,
    ) -> Result<(), DialogueError> {
        self.journal
            .record(Category::Bot, sender, &format!("Menu choice: {choice}"))
            .await;
        self.reply(sender, reply).await;
        self.sessions.delete(sender).await;
        Ok(())
    }

    async fn print_direct(&self, sender: &str, text: &str) -> Result<(), DialogueError> {
        let nota_no = parse_print_nota(text).ok_or(DialogueError::MalformedCommand)?;

        self.journal
            .record(Category::Bot, sender, &format!("Printing nota {nota_no}"))
            .await;
        self.reply(sender, replies::PRINT_PREPARING).await;

        let image = self
            .gateway
            .generate_nota(&nota_no)
            .await
            .map_err(|source| DialogueError::RemoteCall {
                step: RemoteStep::PrintNota,
                source,
            })?;
        self.send_nota(sender, image, replies::PRINT_CAPTION, RemoteStep::PrintNota)
            .await?;

        self.journal
            .record(Category::Bot, sender, &format!("Nota sent (nota_no: {nota_no})"))
            .await;
        Ok(())
    }

    async fn accept_customer(&self, sender: &str, text: &str) -> Result<(), DialogueError> {
        let customer = parse_customer(text);
        debug!(sender = %sender, ?customer, "Customer data parsed");

        self.sessions
            .set(
                sender,
                Session::CollectingItems {
                    order: Order::new(customer),
                },
            )
            .await;
        self.journal
            .record(Category::Bot, sender, "Customer data stored, collecting items")
            .await;
        self.reply(sender, replies::CUSTOMER_SAVED).await;
        Ok(())
    }

    async fn add_item(&self, sender: &str, text: &str) -> Result<(), DialogueError> {
        let item = parse_item(text);
        let summary = format!("{item:?}");

        let added = self
            .sessions
            .update(sender, |session| match session {
                Session::CollectingItems { order } => {
                    order.barang.push(item);
                    Some(order.barang.len())
                }
                Session::Menu => None,
            })
            .await
            .flatten();

        let Some(count) = added else {
            return Err(DialogueError::MissingPrecondition(Precondition::CustomerData));
        };

        self.journal
            .record(
                Category::Bot,
                sender,
                &format!("Item #{count} added ({summary})"),
            )
            .await;
        self.reply(sender, replies::ITEM_SAVED).await;
        Ok(())
    }

    async fn checkout(&self, sender: &str, session: Option<Session>) -> Result<(), DialogueError> {
        let Some(order) = session.as_ref().and_then(Session::order) else {
            return Err(DialogueError::MissingPrecondition(Precondition::ActiveOrder));
        };

        self.reply(sender, replies::SAVING).await;
        self.journal
            .record(Category::Bot, sender, "Order finished, saving to server")
            .await;

        let nota_no = self.run_checkout_saga(sender, order).await?;

        self.sessions.delete(sender).await;
        self.journal
            .record(
                Category::Bot,
                sender,
                &format!("New nota sent (nota_no: {nota_no})"),
            )
            .await;
        Ok(())
    }

    /// Save then render. Stops at the first failing step.
    async fn run_checkout_saga(&self, sender: &str, order: &Order) -> Result<String, DialogueError> {
        let nota_no = self
            .gateway
            .save_transaction(order)
            .await
            .map_err(|source| DialogueError::RemoteCall {
                step: RemoteStep::SaveTransaction,
                source,
            })?;
        info!(sender = %sender, nota_no = %nota_no, "Transaction saved");
        self.reply(sender, replies::SAVED_RENDERING).await;

        let image = self
            .gateway
            .generate_nota(&nota_no)
            .await
            .map_err(|source| DialogueError::RemoteCall {
                step: RemoteStep::GenerateNota,
                source,
            })?;
        self.send_nota(sender, image, replies::NEW_NOTA_CAPTION, RemoteStep::GenerateNota)
            .await?;
        Ok(nota_no)
    }

    async fn sender_lock(&self, sender: &str) -> Arc<Mutex<()>> {
        let mut locks = self.sender_locks.lock().await;
        locks.entry(sender.to_string()).or_default().clone()
    }

    /// Forgets the sender's lock once no other message of theirs holds or
    /// waits for it. Clones are only taken under `sender_locks`, so the
    /// count can't grow while we look at it.
    async fn release_sender_lock(&self, sender: &str, lock: &Arc<Mutex<()>>) {
        let mut locks = self.sender_locks.lock().await;
        // One reference in the map, one held by this turn
        if Arc::strong_count(lock) == 2 {
            locks.remove(sender);
        }
    }

    async fn reply(&self, sender: &str, text: &str) {
        if let Err(e) = self.transport.reply(sender, text).await {
            warn!(sender = %sender, error = %e, "Failed to deliver reply");
        }
    }

    /// The nota number only reaches the user inside the image, so a lost
    /// image fails the command.
    async fn send_nota(
        &self,
        sender: &str,
        image: NotaImage,
        caption: &str,
        step: RemoteStep,
    ) -> Result<(), DialogueError> {
        let media = OutgoingMedia {
            bytes: image.bytes,
            mime_type: NOTA_MIME_TYPE.to_string(),
            file_name: NOTA_FILE_NAME.to_string(),
            caption: caption.to_string(),
        };
        self.transport
            .send_media(sender, &media)
            .await
            .map_err(|e| DialogueError::Delivery {
                step,
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockInvoiceGateway;
    use crate::session::Customer;
    use crate::testing::{
        mock_gateway_unreachable, mock_journal_noop, mock_transport_capturing,
        mock_transport_media_failing, Sent,
    };
    use std::sync::Mutex as StdMutex;

    const SENDER: &str = "6281234567@c.us";
    const CUSTOMER_MSG: &str = "Nama : Budi\nAlamat : Bandung\nTelepon : 0812";
    const ITEM_MSG: &str = "Barang1\nNama : Bibit Durian\nQty : 2\nHarga : 500000";

    fn engine(gateway: MockInvoiceGateway) -> (DialogueEngine, Arc<StdMutex<Vec<Sent>>>) {
        let sent = Arc::new(StdMutex::new(Vec::new()));
        let engine = DialogueEngine::new(
            Arc::new(gateway),
            Arc::new(mock_transport_capturing(sent.clone())),
            Arc::new(mock_journal_noop()),
        );
        (engine, sent)
    }

    fn texts(sent: &StdMutex<Vec<Sent>>) -> Vec<String> {
        sent.lock()
            .map(|s| {
                s.iter()
                    .filter_map(|m| match m {
                        Sent::Text(t) => Some(t.clone()),
                        Sent::Media { .. } => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_menu_then_choice_deletes_session() {
        let (engine, sent) = engine(mock_gateway_unreachable());

        engine.handle_message(SENDER, "List Bot").await;
        assert_eq!(engine.sessions().get(SENDER).await, Some(Session::Menu));

        let outcome = engine.handle_message(SENDER, "1").await;
        assert!(matches!(outcome, Outcome::Handled(Intent::MenuChoicePrint)));
        assert!(engine.sessions().get(SENDER).await.is_none());
        assert_eq!(
            texts(&sent),
            vec![replies::MAIN_MENU.to_string(), replies::PRINT_INSTRUCTIONS.to_string()]
        );
    }

    #[tokio::test]
    async fn test_menu_choice_outside_menu_is_ignored() {
        let (engine, sent) = engine(mock_gateway_unreachable());

        let outcome = engine.handle_message(SENDER, "mau buat nota").await;
        assert!(matches!(outcome, Outcome::Ignored));
        assert!(texts(&sent).is_empty());
    }

    #[tokio::test]
    async fn test_customer_data_starts_collection() {
        let (engine, _sent) = engine(mock_gateway_unreachable());

        engine.handle_message(SENDER, CUSTOMER_MSG).await;

        let session = engine.sessions().get(SENDER).await;
        let expected = Order::new(Customer {
            nama: "Budi".to_string(),
            alamat: "Bandung".to_string(),
            telepon: "0812".to_string(),
        });
        assert_eq!(session, Some(Session::CollectingItems { order: expected }));
    }

    #[tokio::test]
    async fn test_item_without_customer_data_is_rejected() {
        let (engine, sent) = engine(mock_gateway_unreachable());

        engine.handle_message(SENDER, "list bot").await;
        let outcome = engine.handle_message(SENDER, ITEM_MSG).await;

        assert!(matches!(
            outcome,
            Outcome::Rejected(
                Intent::ItemEntry,
                DialogueError::MissingPrecondition(Precondition::CustomerData)
            )
        ));
        assert_eq!(engine.sessions().get(SENDER).await, Some(Session::Menu));
        assert_eq!(
            texts(&sent).last().map(String::as_str),
            Some(replies::CUSTOMER_DATA_FIRST)
        );
    }

    #[tokio::test]
    async fn test_checkout_saves_then_renders() {
        let mut gateway = MockInvoiceGateway::new();
        gateway
            .expect_save_transaction()
            .times(1)
            .returning(|order| {
                assert_eq!(order.barang.len(), 1);
                Ok("77".to_string())
            });
        gateway
            .expect_generate_nota()
            .withf(|nota_no: &str| nota_no == "77")
            .times(1)
            .returning(|_| Ok(NotaImage { bytes: vec![1, 2, 3] }));
        let (engine, sent) = engine(gateway);

        engine.handle_message(SENDER, CUSTOMER_MSG).await;
        engine.handle_message(SENDER, ITEM_MSG).await;
        let outcome = engine.handle_message(SENDER, "tidak").await;

        assert!(matches!(outcome, Outcome::Handled(Intent::Finalize)));
        assert!(engine.sessions().get(SENDER).await.is_none());

        let last = sent.lock().ok().and_then(|s| s.last().cloned());
        assert_eq!(
            last,
            Some(Sent::Media {
                caption: replies::NEW_NOTA_CAPTION.to_string(),
                file_name: NOTA_FILE_NAME.to_string(),
                bytes: vec![1, 2, 3],
            })
        );
    }

    #[tokio::test]
    async fn test_checkout_save_failure_keeps_session() {
        let mut gateway = MockInvoiceGateway::new();
        gateway
            .expect_save_transaction()
            .times(1)
            .returning(|_| Err(GatewayError::Network("connection refused".to_string())));
        gateway.expect_generate_nota().never();
        let (engine, sent) = engine(gateway);

        engine.handle_message(SENDER, CUSTOMER_MSG).await;
        let before = engine.sessions().get(SENDER).await;
        let outcome = engine.handle_message(SENDER, "tidak").await;

        assert!(matches!(
            outcome,
            Outcome::Rejected(
                Intent::Finalize,
                DialogueError::RemoteCall {
                    step: RemoteStep::SaveTransaction,
                    ..
                }
            )
        ));
        assert_eq!(engine.sessions().get(SENDER).await, before);
        assert_eq!(
            texts(&sent).last().map(String::as_str),
            Some(replies::SAVE_FAILED)
        );
    }

    #[tokio::test]
    async fn test_finalize_from_menu_needs_an_order() {
        let (engine, sent) = engine(mock_gateway_unreachable());

        engine.handle_message(SENDER, "list bot").await;
        let outcome = engine.handle_message(SENDER, "tidak").await;

        assert!(matches!(
            outcome,
            Outcome::Rejected(
                Intent::Finalize,
                DialogueError::MissingPrecondition(Precondition::ActiveOrder)
            )
        ));
        assert_eq!(engine.sessions().get(SENDER).await, Some(Session::Menu));
        assert_eq!(
            texts(&sent).last().map(String::as_str),
            Some(replies::NO_ACTIVE_TRANSACTION)
        );
    }

    #[tokio::test]
    async fn test_print_direct_malformed() {
        let (engine, sent) = engine(mock_gateway_unreachable());

        let outcome = engine.handle_message(SENDER, "print nota").await;
        assert!(matches!(
            outcome,
            Outcome::Rejected(Intent::PrintDirect, DialogueError::MalformedCommand)
        ));
        assert_eq!(texts(&sent), vec![replies::PRINT_FORMAT_ERROR.to_string()]);
    }

    #[test]
    fn test_reply_text_per_error() {
        assert_eq!(
            DialogueError::RemoteCall {
                step: RemoteStep::PrintNota,
                source: GatewayError::Api("404".to_string()),
            }
            .reply_text(),
            replies::PRINT_FAILED
        );
        assert_eq!(
            DialogueError::RemoteCall {
                step: RemoteStep::GenerateNota,
                source: GatewayError::Api("500".to_string()),
            }
            .reply_text(),
            replies::SAVE_FAILED
        );
        assert_eq!(
            DialogueError::Delivery {
                step: RemoteStep::PrintNota,
                reason: "chat not found".to_string(),
            }
            .reply_text(),
            replies::PRINT_FAILED
        );
    }

    fn gateway_rendering(nota_no: &'static str) -> MockInvoiceGateway {
        let mut gateway = MockInvoiceGateway::new();
        gateway
            .expect_save_transaction()
            .returning(move |_| Ok(nota_no.to_string()));
        gateway
            .expect_generate_nota()
            .returning(|_| Ok(NotaImage { bytes: vec![9] }));
        gateway
    }

    #[tokio::test]
    async fn test_undelivered_new_nota_keeps_session() {
        let sent = Arc::new(StdMutex::new(Vec::new()));
        let engine = DialogueEngine::new(
            Arc::new(gateway_rendering("9")),
            Arc::new(mock_transport_media_failing(sent.clone())),
            Arc::new(mock_journal_noop()),
        );

        engine.handle_message(SENDER, CUSTOMER_MSG).await;
        let before = engine.sessions().get(SENDER).await;
        let outcome = engine.handle_message(SENDER, "tidak").await;

        assert!(matches!(
            outcome,
            Outcome::Rejected(
                Intent::Finalize,
                DialogueError::Delivery {
                    step: RemoteStep::GenerateNota,
                    ..
                }
            )
        ));
        assert!(before.is_some());
        assert_eq!(engine.sessions().get(SENDER).await, before);
        assert_eq!(
            texts(&sent).last().map(String::as_str),
            Some(replies::SAVE_FAILED)
        );
    }

    #[tokio::test]
    async fn test_undelivered_printed_nota_is_reported() {
        let sent = Arc::new(StdMutex::new(Vec::new()));
        let engine = DialogueEngine::new(
            Arc::new(gateway_rendering("45")),
            Arc::new(mock_transport_media_failing(sent.clone())),
            Arc::new(mock_journal_noop()),
        );

        let outcome = engine.handle_message(SENDER, "print nota : 45/x").await;

        assert!(matches!(
            outcome,
            Outcome::Rejected(
                Intent::PrintDirect,
                DialogueError::Delivery {
                    step: RemoteStep::PrintNota,
                    ..
                }
            )
        ));
        assert_eq!(
            texts(&sent).last().map(String::as_str),
            Some(replies::PRINT_FAILED)
        );
    }

    #[tokio::test]
    async fn test_sender_locks_are_released_after_each_turn() {
        let (engine, _sent) = engine(mock_gateway_unreachable());

        engine.handle_message(SENDER, "halo").await;
        engine.handle_message("6289999@c.us", "list bot").await;

        assert!(engine.sender_locks.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_sender_lock_kept_while_another_turn_waits() {
        let (engine, _sent) = engine(mock_gateway_unreachable());

        let lock = engine.sender_lock(SENDER).await;
        let waiting = lock.clone();
        engine.release_sender_lock(SENDER, &lock).await;
        assert!(engine.sender_locks.lock().await.contains_key(SENDER));

        drop(waiting);
        engine.release_sender_lock(SENDER, &lock).await;
        assert!(engine.sender_locks.lock().await.is_empty());
    }
}
