//! Testing helpers and mock utilities.
//!
//! Provides convenient constructors for mocked gateway, transport and
//! journal collaborators.

use crate::gateway::MockInvoiceGateway;
use crate::journal::MockJournal;
use crate::transport::MockTransport;
use std::sync::{Arc, Mutex};

/// Something the engine handed to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    /// A text reply
    Text(String),
    /// A media attachment
    Media {
        /// Caption sent with the media
        caption: String,
        /// File name of the attachment
        file_name: String,
        /// Attachment content
        bytes: Vec<u8>,
    },
}

/// Create a mock journal that accepts and drops every entry.
#[must_use]
pub fn mock_journal_noop() -> MockJournal {
    let mut mock = MockJournal::new();
    mock.expect_record().returning(|_, _, _| ());
    mock
}

/// Create a mock gateway that fails the test if it is ever called.
#[must_use]
pub fn mock_gateway_unreachable() -> MockInvoiceGateway {
    let mut mock = MockInvoiceGateway::new();
    mock.expect_generate_nota().never();
    mock.expect_save_transaction().never();
    mock
}

/// Create a mock transport that records everything sent into `sent`.
///
/// # Example
///
/// ```rust,ignore
/// let sent = Arc::new(Mutex::new(Vec::new()));
/// let transport = mock_transport_capturing(sent.clone());
/// ```
#[must_use]
pub fn mock_transport_capturing(sent: Arc<Mutex<Vec<Sent>>>) -> MockTransport {
    let mut mock = MockTransport::new();

    let replies = sent.clone();
    mock.expect_reply().returning(move |_, text| {
        if let Ok(mut log) = replies.lock() {
            log.push(Sent::Text(text.to_string()));
        }
        Ok(())
    });

    mock.expect_send_media().returning(move |_, media| {
        if let Ok(mut log) = sent.lock() {
            log.push(Sent::Media {
                caption: media.caption.clone(),
                file_name: media.file_name.clone(),
                bytes: media.bytes.clone(),
            });
        }
        Ok(())
    });

    mock
}

/// Create a mock transport that records text replies into `sent` and fails
/// every media upload.
#[must_use]
pub fn mock_transport_media_failing(sent: Arc<Mutex<Vec<Sent>>>) -> MockTransport {
    let mut mock = MockTransport::new();

    mock.expect_reply().returning(move |_, text| {
        if let Ok(mut log) = sent.lock() {
            log.push(Sent::Text(text.to_string()));
        }
        Ok(())
    });
    mock.expect_send_media()
        .returning(|_, _| Err(anyhow::anyhow!("chat not found")));

    mock
}
