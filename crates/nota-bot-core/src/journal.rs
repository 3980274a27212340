//! Command journal
//!
//! Append-only audit trail of `(timestamp, category, sender, message)`
//! lines, separate from `tracing` output. Writing to the journal never fails
//! the caller: errors are logged and dropped.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

/// Sender used for process lifecycle entries
pub const SYSTEM_SENDER: &str = "-";

/// Jakarta (WIB) offset from UTC, in seconds
const WIB_OFFSET_SECS: i32 = 7 * 3600;

/// Errors that can occur while writing the journal
#[derive(Debug, Error)]
pub enum JournalError {
    /// Standard I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid fixed timezone offset
    #[error("Invalid timezone offset")]
    Offset,
}

/// Category of a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Process lifecycle
    System,
    /// Every inbound message
    Inbox,
    /// Inbound messages recognised as commands
    User,
    /// What the bot did in response
    Bot,
    /// Failed remote calls
    Error,
    /// Ignored messages
    Info,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::System => "SYSTEM",
            Self::Inbox => "INBOX",
            Self::User => "USER",
            Self::Bot => "BOT",
            Self::Error => "ERROR",
            Self::Info => "INFO",
        };
        f.write_str(label)
    }
}

/// Sink for journal entries
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Journal: Send + Sync {
    /// Record one entry. Must not fail or block message handling.
    async fn record(&self, category: Category, sender: &str, message: &str);
}

/// Formats one journal line, including the trailing newline.
///
/// # Errors
///
/// Returns `JournalError::Offset` if the WIB offset cannot be built.
pub fn format_line(
    at: DateTime<Utc>,
    category: Category,
    sender: &str,
    message: &str,
) -> Result<String, JournalError> {
    let wib = FixedOffset::east_opt(WIB_OFFSET_SECS).ok_or(JournalError::Offset)?;
    let time = at.with_timezone(&wib).format("%d/%m/%Y %H:%M:%S WIB");
    Ok(format!("[{time}] [{category}] {sender} → {message}\n"))
}

/// File-backed journal appending one line per entry
pub struct FileJournal {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileJournal {
    /// Open a journal at `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, JournalError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// Journal file location
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append(&self, line: &str) -> Result<(), JournalError> {
        let _guard = self.lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl Journal for FileJournal {
    async fn record(&self, category: Category, sender: &str, message: &str) {
        let result = match format_line(Utc::now(), category, sender, message) {
            Ok(line) => self.append(&line).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "Failed to write journal entry");
        }
    }
}

/// Journal that only mirrors entries to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingJournal;

#[async_trait]
impl Journal for TracingJournal {
    async fn record(&self, category: Category, sender: &str, message: &str) {
        tracing::info!(%category, sender = %sender, "{message}");
    }
}
