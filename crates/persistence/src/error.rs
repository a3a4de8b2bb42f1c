//! Persistence errors

use thiserror::Error;

/// Errors raised by a client record gateway
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The backend did not answer within the request budget
    #[error("API_TIMEOUT: backend did not answer in time")]
    Timeout,

    /// The backend answered with a non-2xx status
    #[error("API_ERROR: backend returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl GatewayError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Short label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Api { .. } => "api",
            Self::Request(_) => "request",
            Self::Decode(_) => "decode",
            Self::Io(_) => "io",
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Request(err.to_string())
        }
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        GatewayError::Io(err.to_string())
    }
}

/// Errors raised while staging a document locally
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Invalid chat id for document path: {0}")]
    InvalidChatId(String),

    #[error("Failed to write document: {0}")]
    Io(#[from] std::io::Error),
}
