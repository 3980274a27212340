//! Per-sender order sessions.
//!
//! Sessions live only in process memory: a restart silently drops every
//! in-flight order. A sender without an entry has no session; there is no
//! "default" step.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::debug;

/// One line item: lower-cased field name to value, no fixed schema.
pub type Item = BTreeMap<String, String>;

/// Customer record extracted from a customer-data message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer name
    pub nama: String,
    /// Customer address
    pub alamat: String,
    /// Customer phone number
    pub telepon: String,
}

/// An order in progress, serialized as the `save-transaksi` request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Customer the order belongs to
    #[serde(flatten)]
    pub customer: Customer,
    /// Items in the order they were sent
    pub barang: Vec<Item>,
}

impl Order {
    /// Creates an order with no items yet
    #[must_use]
    pub const fn new(customer: Customer) -> Self {
        Self {
            customer,
            barang: Vec::new(),
        }
    }
}

/// Dialogue step of an active session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Main menu shown, waiting for a choice
    Menu,
    /// Customer data received, collecting items
    CollectingItems,
}

/// State of an active session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    /// Main menu shown, waiting for a choice
    Menu,
    /// Collecting items for an order
    CollectingItems {
        /// The order being built
        order: Order,
    },
}

impl Session {
    /// Current dialogue step
    #[must_use]
    pub const fn step(&self) -> Step {
        match self {
            Self::Menu => Step::Menu,
            Self::CollectingItems { .. } => Step::CollectingItems,
        }
    }

    /// The order being built, if any
    #[must_use]
    pub const fn order(&self) -> Option<&Order> {
        match self {
            Self::Menu => None,
            Self::CollectingItems { order } => Some(order),
        }
    }
}

/// In-memory session store keyed by sender.
///
/// No expiry and no capacity bound; entries disappear only through
/// [`SessionStore::delete`] or process exit.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of the sender's session
    pub async fn get(&self, sender: &str) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions.get(sender).cloned()
    }

    /// Check if the sender has a session
    pub async fn contains(&self, sender: &str) -> bool {
        let sessions = self.sessions.read().await;
        sessions.contains_key(sender)
    }

    /// Create or overwrite the sender's session
    pub async fn set(&self, sender: &str, session: Session) {
        let mut sessions = self.sessions.write().await;
        if let Some(previous) = sessions.insert(sender.to_string(), session) {
            debug!(sender = %sender, step = ?previous.step(), "Session overwritten");
        }
    }

    /// Mutate the sender's session in place.
    ///
    /// Returns `None` without calling `f` when there is no session.
    pub async fn update<F, R>(&self, sender: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(sender).map(f)
    }

    /// Delete the sender's session, returning it if it existed
    pub async fn delete(&self, sender: &str) -> Option<Session> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(sender)
    }

    /// Number of sessions in progress
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no session is in progress
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
