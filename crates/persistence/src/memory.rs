//! In-memory client gateway
//!
//! Holds records in a map with the same merge and create-on-miss semantics
//! as the REST backend. Uploaded documents are referenced by their local
//! path and left on disk.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;

use zailo_bot_core::{ClientRecord, ContactInfo, PendingUpload, RecordPatch};

use crate::{ClientGateway, GatewayError};

#[derive(Default)]
pub struct InMemoryClientGateway {
    records: RwLock<HashMap<String, ClientRecord>>,
    /// Error returned by the next gateway call, for failure-path tests
    pending_failure: Mutex<Option<GatewayError>>,
    logins: Mutex<Vec<String>>,
    logouts: Mutex<usize>,
}

impl InMemoryClientGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record as-is, replacing any existing one
    pub fn insert(&self, record: ClientRecord) {
        self.records.write().insert(record.chat_id.clone(), record);
    }

    pub fn record(&self, chat_id: &str) -> Option<ClientRecord> {
        self.records.read().get(chat_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Make the next call fail with `error`
    pub fn fail_next(&self, error: GatewayError) {
        *self.pending_failure.lock() = Some(error);
    }

    pub fn logins(&self) -> Vec<String> {
        self.logins.lock().clone()
    }

    pub fn logout_count(&self) -> usize {
        *self.logouts.lock()
    }

    fn take_failure(&self) -> Result<(), GatewayError> {
        match self.pending_failure.lock().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ClientGateway for InMemoryClientGateway {
    async fn get_state(
        &self,
        chat_id: &str,
        contact: &ContactInfo,
    ) -> Result<ClientRecord, GatewayError> {
        self.take_failure()?;
        let mut records = self.records.write();
        let record = records.entry(chat_id.to_string()).or_insert_with(|| {
            tracing::info!(chat_id = %chat_id, "Client not found, creating record");
            ClientRecord::seed(chat_id, contact.push_name.as_deref(), &contact.number)
        });
        Ok(record.clone())
    }

    async fn find(&self, chat_id: &str) -> Result<Option<ClientRecord>, GatewayError> {
        self.take_failure()?;
        Ok(self.record(chat_id))
    }

    async fn update_state(
        &self,
        chat_id: &str,
        patch: &RecordPatch,
        uploads: Vec<PendingUpload>,
    ) -> Result<ClientRecord, GatewayError> {
        self.take_failure()?;
        let mut records = self.records.write();
        let record = records.get_mut(chat_id).ok_or_else(|| GatewayError::Api {
            status: 404,
            body: format!("client {} not found", chat_id),
        })?;

        patch.apply_to(record, Utc::now());
        for upload in uploads {
            record.attach_document(upload.field, upload.path.display().to_string());
        }
        Ok(record.clone())
    }

    async fn report_login(&self, phone_number: &str) -> Result<(), GatewayError> {
        self.logins.lock().push(phone_number.to_string());
        Ok(())
    }

    async fn report_logout(&self) -> Result<(), GatewayError> {
        *self.logouts.lock() += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "in_memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zailo_bot_core::{DialogueState, DocumentField};

    fn contact() -> ContactInfo {
        ContactInfo {
            push_name: None,
            number: "5511".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_on_first_lookup() {
        let gateway = InMemoryClientGateway::new();
        let record = gateway.get_state("5511@c.us", &contact()).await.unwrap();

        assert_eq!(record.name.as_deref(), Some("Cliente 5511"));
        assert_eq!(gateway.len(), 1);
    }

    #[tokio::test]
    async fn test_update_applies_patch_and_uploads() {
        let gateway = InMemoryClientGateway::new();
        gateway.get_state("5511@c.us", &contact()).await.unwrap();

        let upload = PendingUpload::new(DocumentField::TradeInPhoto, "/tmp/a.jpeg", "image/jpeg");
        let record = gateway
            .update_state(
                "5511@c.us",
                &RecordPatch::transition(DialogueState::TradeInConfirmMorePhotos),
                vec![upload],
            )
            .await
            .unwrap();

        assert_eq!(record.bot_data.state, DialogueState::TradeInConfirmMorePhotos);
        assert_eq!(record.bot_data.trade_in_car.photos, vec!["/tmp/a.jpeg"]);
        assert_eq!(record.documents, vec!["/tmp/a.jpeg"]);
    }

    #[tokio::test]
    async fn test_reset_state() {
        let gateway = InMemoryClientGateway::new();
        gateway.get_state("5511@c.us", &contact()).await.unwrap();
        gateway
            .update_state(
                "5511@c.us",
                &RecordPatch::transition(DialogueState::FinancingAskCpf),
                Vec::new(),
            )
            .await
            .unwrap();

        gateway.reset_state("5511@c.us").await.unwrap();
        let record = gateway.record("5511@c.us").unwrap();
        assert_eq!(record.bot_data.state, DialogueState::LeadReceived);
        assert_eq!(record.bot_data.previous_state, None);
    }

    #[tokio::test]
    async fn test_injected_failure_is_one_shot() {
        let gateway = InMemoryClientGateway::new();
        gateway.fail_next(GatewayError::Timeout);

        assert!(gateway
            .get_state("5511@c.us", &contact())
            .await
            .unwrap_err()
            .is_timeout());
        assert!(gateway.get_state("5511@c.us", &contact()).await.is_ok());
    }
}
