//! Client record gateway trait

use async_trait::async_trait;

use zailo_bot_core::{ClientRecord, ContactInfo, PendingUpload, RecordPatch};

use crate::GatewayError;

/// Durable store of client records, one per chat
#[async_trait]
pub trait ClientGateway: Send + Sync {
    /// Fetch the record, creating a seeded one when the chat is new
    async fn get_state(
        &self,
        chat_id: &str,
        contact: &ContactInfo,
    ) -> Result<ClientRecord, GatewayError>;

    /// Fetch the record without creating it
    async fn find(&self, chat_id: &str) -> Result<Option<ClientRecord>, GatewayError>;

    /// Re-read the record, shallow-merge `patch` over it and persist.
    ///
    /// Staged `uploads` are sent along with the record and removed from the
    /// local disk once the backend confirms them.
    async fn update_state(
        &self,
        chat_id: &str,
        patch: &RecordPatch,
        uploads: Vec<PendingUpload>,
    ) -> Result<ClientRecord, GatewayError>;

    /// Return the chat to the initial step and clear the negotiation
    async fn reset_state(&self, chat_id: &str) -> Result<(), GatewayError> {
        self.update_state(chat_id, &RecordPatch::reset(), Vec::new())
            .await
            .map(|_| ())
    }

    /// Tell the backend the bot session is up
    async fn report_login(&self, _phone_number: &str) -> Result<(), GatewayError> {
        Ok(())
    }

    /// Tell the backend the bot session went away
    async fn report_logout(&self) -> Result<(), GatewayError> {
        Ok(())
    }

    /// Gateway name for logs
    fn name(&self) -> &str;
}
