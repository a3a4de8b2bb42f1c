//! Error types shared across crates

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown dialogue state: {0}")]
    UnknownState(String),

    #[error("Unknown document field: {0}")]
    UnknownDocumentField(String),
}

/// Errors raised by a messaging transport
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Transport timed out")]
    Timeout,

    #[error("Transport rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Transport request failed: {0}")]
    Request(String),

    #[error("Transport not connected")]
    NotConnected,
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}
