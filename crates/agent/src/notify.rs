//! Sales-team notification
//!
//! On handoff every configured salesperson receives a summary of the lead
//! followed by the collected documents. Delivery to one contact failing
//! does not stop delivery to the others.

use serde_json::Value;
use std::sync::Arc;

use zailo_bot_config::StoreProfile;
use zailo_bot_core::{ClientRecord, MessageTransport, OutboundMessage};
use zailo_bot_persistence::ClientGateway;
use zailo_bot_text_processing::mask_cpf;

use crate::AgentError;

pub struct SalesNotifier {
    store: Arc<StoreProfile>,
    gateway: Arc<dyn ClientGateway>,
    transport: Arc<dyn MessageTransport>,
}

impl SalesNotifier {
    pub fn new(
        store: Arc<StoreProfile>,
        gateway: Arc<dyn ClientGateway>,
        transport: Arc<dyn MessageTransport>,
    ) -> Self {
        Self {
            store,
            gateway,
            transport,
        }
    }

    /// Send the lead summary for `chat_id` to every salesperson.
    ///
    /// Returns the number of contacts that received the summary.
    pub async fn notify(&self, chat_id: &str, status: &str) -> Result<usize, AgentError> {
        let recipients = self.store.sales_chat_ids();
        if recipients.is_empty() {
            tracing::warn!(chat_id = %chat_id, "No sales contact configured, lead not forwarded");
            return Ok(0);
        }

        let Some(record) = self.gateway.find(chat_id).await? else {
            tracing::warn!(chat_id = %chat_id, "Lead record disappeared before notification");
            return Ok(0);
        };

        let report = self.report(&record, status);
        let attachments = record.attachments();
        let caption = format!("Anexo de {}", record.display_name());

        let mut delivered = 0;
        for recipient in &recipients {
            match self
                .deliver(recipient, &report, &attachments, &caption)
                .await
            {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::error!(
                        chat_id = %chat_id,
                        recipient = %recipient,
                        error = %e,
                        "Failed to notify salesperson"
                    );
                },
            }
        }

        metrics::counter!("zailo_bot_notifications_total").increment(delivered as u64);
        tracing::info!(
            chat_id = %chat_id,
            status = %status,
            delivered,
            recipients = recipients.len(),
            "Lead forwarded to sales team"
        );
        Ok(delivered)
    }

    async fn deliver(
        &self,
        recipient: &str,
        report: &str,
        attachments: &[&str],
        caption: &str,
    ) -> Result<(), AgentError> {
        self.transport
            .send(recipient, OutboundMessage::text(report))
            .await?;

        if attachments.is_empty() {
            return Ok(());
        }
        self.transport
            .send(recipient, OutboundMessage::text("Anexos do cliente:"))
            .await?;
        for reference in attachments {
            self.transport
                .send(
                    recipient,
                    OutboundMessage::media(*reference, Some(caption.to_string())),
                )
                .await?;
        }
        Ok(())
    }

    fn report(&self, record: &ClientRecord, status: &str) -> String {
        format!(
            "🔔 *NOVA OPORTUNIDADE (BOT {})* 🔔\n\n*Cliente:* {} ({})\n*Status:* {}\n\n*Resumo do Atendimento:*\n```{}```",
            self.store.assistant_name,
            record.display_name(),
            record.chat_id,
            status,
            summary_json(record)
        )
    }
}

/// Record as pretty JSON without the dialogue memory and with the CPF masked
fn summary_json(record: &ClientRecord) -> String {
    let mut value = serde_json::to_value(record).unwrap_or(Value::Null);
    if let Value::Object(map) = &mut value {
        map.remove("bot_data");
        if let Some(Value::String(cpf)) = map.get("cpf") {
            let masked = mask_cpf(cpf).to_string();
            map.insert("cpf".to_string(), Value::String(masked));
        }
    }
    serde_json::to_string_pretty(&value).unwrap_or_default()
}
