//! In-memory transport
//!
//! Used when no bridge is configured and by the dialogue tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;

use zailo_bot_core::{MessageTransport, OutboundMessage, TransportError};

#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub chat_id: String,
    pub message: OutboundMessage,
}

#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<SentMessage>>,
    typing: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every send to `chat_id`
    pub fn fail_for(&self, chat_id: impl Into<String>) {
        self.failing.lock().insert(chat_id.into());
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    /// Text bodies sent to `chat_id`, in order
    pub fn texts_for(&self, chat_id: &str) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .filter_map(|m| m.message.as_text().map(str::to_string))
            .collect()
    }

    pub fn messages_for(&self, chat_id: &str) -> Vec<OutboundMessage> {
        self.sent
            .lock()
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .map(|m| m.message.clone())
            .collect()
    }

    pub fn typing_count(&self, chat_id: &str) -> usize {
        self.typing.lock().iter().filter(|c| *c == chat_id).count()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
        self.typing.lock().clear();
    }
}

#[async_trait]
impl MessageTransport for RecordingTransport {
    async fn send(&self, chat_id: &str, message: OutboundMessage) -> Result<(), TransportError> {
        if self.failing.lock().contains(chat_id) {
            return Err(TransportError::Rejected {
                status: 400,
                body: format!("chat {} unreachable", chat_id),
            });
        }
        tracing::debug!(chat_id = %chat_id, "Recorded outbound message");
        self.sent.lock().push(SentMessage {
            chat_id: chat_id.to_string(),
            message,
        });
        Ok(())
    }

    async fn send_typing(&self, chat_id: &str) -> Result<(), TransportError> {
        self.typing.lock().push(chat_id.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_in_order() {
        let transport = RecordingTransport::new();
        transport.send("a", OutboundMessage::text("1")).await.unwrap();
        transport
            .send("a", OutboundMessage::media("http://x/1.jpg", None))
            .await
            .unwrap();
        transport.send("b", OutboundMessage::text("2")).await.unwrap();

        assert_eq!(transport.texts_for("a"), vec!["1"]);
        assert_eq!(transport.messages_for("a").len(), 2);
        assert_eq!(transport.sent().len(), 3);
    }

    #[tokio::test]
    async fn test_failing_chat() {
        let transport = RecordingTransport::new();
        transport.fail_for("a");
        assert!(transport.send("a", OutboundMessage::text("1")).await.is_err());
        assert!(transport.sent().is_empty());
    }
}
