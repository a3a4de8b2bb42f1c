//! Core traits
//!
//! The messaging transport is pluggable so the dialogue engine can run
//! against the WhatsApp bridge in production and a recorder in tests.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::message::OutboundMessage;

/// Outbound side of the chat transport
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Deliver one message to a chat
    async fn send(&self, chat_id: &str, message: OutboundMessage) -> Result<(), TransportError>;

    /// Show the "typing..." indicator; transports without one do nothing
    async fn send_typing(&self, _chat_id: &str) -> Result<(), TransportError> {
        Ok(())
    }

    /// Transport name for logs
    fn name(&self) -> &str;
}
