#![deny(missing_docs)]
//! Nota Bot core library.
//!
//! Transport-agnostic order-taking dialogue: message classification,
//! per-sender sessions, the dialogue state machine and its collaborators
//! (invoice gateway, transport, command journal).

/// Message classification into intents.
pub mod classifier;
/// Configuration management.
pub mod config;
/// The per-sender dialogue state machine.
pub mod dialogue;
/// Remote invoicing service client.
pub mod gateway;
/// Append-only command journal.
pub mod journal;
/// Payload parsers for commands, customer data and items.
pub mod parser;
/// User-facing reply texts.
pub mod replies;
/// In-memory session store.
pub mod session;
/// Outbound transport interface.
pub mod transport;

#[cfg(test)]
pub mod testing;
