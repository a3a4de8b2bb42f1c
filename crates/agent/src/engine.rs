//! Turn orchestration
//!
//! One inbound message is one turn:
//! 1. filter (non-user chats, own messages) and readiness gate
//! 2. per-chat lock, typing indicator, record lookup
//! 3. stage attached media when the current step collects a document
//! 4. `handle_turn` → persist patch and uploads → paced replies
//! 5. on handoff: notify the sales team and reset the record
//!
//! Any gateway or transport failure aborts the turn with an apology and a
//! forced reset.
//!
//! [`DialogueEngine::enqueue`] is the entry point for callers that must not
//! wait for the turn. Messages of one chat are queued in arrival order and
//! drained by a single worker task, so a message is never processed before
//! the one that arrived ahead of it.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use zailo_bot_config::StoreProfile;
use zailo_bot_core::{
    ClientRecord, DialogueState, InboundMessage, MessageTransport, OutboundMessage, PendingUpload,
};
use zailo_bot_persistence::{ClientGateway, DocumentStore};

use crate::catalog::Catalog;
use crate::flow::{handle_turn, FlowContext, Transition};
use crate::messages;
use crate::notify::SalesNotifier;
use crate::AgentError;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Delay between consecutive replies of one turn
    pub pacing: Duration,
    /// Only chats with this suffix are user chats
    pub chat_suffix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pacing: Duration::from_millis(500),
            chat_suffix: "@c.us".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Group chat, status broadcast or the bot's own message
    Ignored,
    /// Transport session not connected yet; the customer was asked to retry
    NotReady,
    Completed {
        from: DialogueState,
        to: DialogueState,
        handed_off: bool,
    },
    /// Turn aborted; the customer got an apology and the record was reset
    Failed { kind: &'static str },
}

pub struct DialogueEngine {
    store: Arc<StoreProfile>,
    catalog: Arc<Catalog>,
    gateway: Arc<dyn ClientGateway>,
    transport: Arc<dyn MessageTransport>,
    documents: DocumentStore,
    notifier: SalesNotifier,
    config: EngineConfig,
    ready: AtomicBool,
    chat_locks: DashMap<String, Arc<Mutex<()>>>,
    /// Messages waiting for their chat's worker; an entry exists while the worker runs
    queues: DashMap<String, VecDeque<InboundMessage>>,
}

impl DialogueEngine {
    pub fn new(
        store: Arc<StoreProfile>,
        catalog: Arc<Catalog>,
        gateway: Arc<dyn ClientGateway>,
        transport: Arc<dyn MessageTransport>,
        documents: DocumentStore,
        config: EngineConfig,
    ) -> Self {
        let notifier = SalesNotifier::new(store.clone(), gateway.clone(), transport.clone());
        Self {
            store,
            catalog,
            gateway,
            transport,
            documents,
            notifier,
            config,
            ready: AtomicBool::new(false),
            chat_locks: DashMap::new(),
            queues: DashMap::new(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &StoreProfile {
        &self.store
    }

    /// Chats with a turn in flight
    pub fn active_chats(&self) -> usize {
        self.chat_locks.len()
    }

    /// Chats with queued messages or a running worker
    pub fn queued_chats(&self) -> usize {
        self.queues.len()
    }

    /// Queue `message` behind earlier messages of the same chat and return
    /// without waiting for the turn.
    pub fn enqueue(self: &Arc<Self>, message: InboundMessage) {
        let chat_id = message.chat_id.clone();
        let start_worker = match self.queues.entry(chat_id.clone()) {
            Entry::Occupied(mut queued) => {
                queued.get_mut().push_back(message);
                false
            },
            Entry::Vacant(slot) => {
                slot.insert(VecDeque::from([message]));
                true
            },
        };

        if start_worker {
            let engine = Arc::clone(self);
            tokio::spawn(async move { engine.drain(chat_id).await });
        }
    }

    async fn drain(self: Arc<Self>, chat_id: String) {
        while let Some(message) = self.next_queued(&chat_id) {
            match self.handle_message(message).await {
                TurnOutcome::Failed { kind } => {
                    tracing::warn!(chat_id = %chat_id, kind, "Queued turn failed");
                },
                outcome => {
                    tracing::debug!(chat_id = %chat_id, ?outcome, "Queued turn finished");
                },
            }
        }
    }

    /// Pop the next message, dropping the queue when it is empty.
    ///
    /// Both happen under the entry lock, so `enqueue` either sees the
    /// queue and leaves the message to this worker, or sees no queue and
    /// starts a new worker.
    fn next_queued(&self, chat_id: &str) -> Option<InboundMessage> {
        match self.queues.entry(chat_id.to_string()) {
            Entry::Occupied(mut queued) => match queued.get_mut().pop_front() {
                Some(message) => Some(message),
                None => {
                    queued.remove();
                    None
                },
            },
            Entry::Vacant(_) => None,
        }
    }

    /// Transport session came up as `phone_number`
    pub async fn on_connected(&self, phone_number: &str) {
        self.set_ready(true);
        tracing::info!(phone = %phone_number, "Bot connected and ready");

        if let Err(e) = self.gateway.report_login(phone_number).await {
            tracing::warn!(error = %e, "Failed to report login to backend");
        }

        let own_chat = format!("{}{}", phone_number, self.config.chat_suffix);
        let timestamp = chrono::Local::now().format("%d/%m/%Y %H:%M:%S").to_string();
        if let Err(e) = self
            .transport
            .send(&own_chat, OutboundMessage::text(messages::bot_connected(&timestamp)))
            .await
        {
            tracing::warn!(error = %e, "Failed to send connection notice");
        }
    }

    /// Transport session went away
    pub async fn on_disconnected(&self) {
        self.set_ready(false);
        tracing::warn!("Bot disconnected");

        if let Err(e) = self.gateway.report_logout().await {
            tracing::warn!(error = %e, "Failed to report logout to backend");
        }
    }

    /// Process one inbound message
    pub async fn handle_message(&self, message: InboundMessage) -> TurnOutcome {
        if message.from_me || !message.chat_id.ends_with(&self.config.chat_suffix) {
            tracing::trace!(chat_id = %message.chat_id, "Ignoring message");
            return TurnOutcome::Ignored;
        }
        metrics::counter!("zailo_bot_messages_total").increment(1);

        if !self.is_ready() {
            if let Err(e) = self
                .transport
                .send(&message.chat_id, OutboundMessage::text(messages::NOT_READY))
                .await
            {
                tracing::warn!(chat_id = %message.chat_id, error = %e, "Failed to send not-ready notice");
            }
            return TurnOutcome::NotReady;
        }

        let chat_id = message.chat_id.clone();
        let lock = self.chat_lock(&chat_id);
        let started = Instant::now();

        let outcome = {
            let _turn = lock.lock().await;
            match self.run_turn(&message).await {
                Ok(outcome) => outcome,
                Err(err) => self.recover(&chat_id, err).await,
            }
        };

        drop(lock);
        self.chat_locks
            .remove_if(&chat_id, |_, lock| Arc::strong_count(lock) == 1);

        metrics::histogram!("zailo_bot_turn_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        outcome
    }

    fn chat_lock(&self, chat_id: &str) -> Arc<Mutex<()>> {
        self.chat_locks
            .entry(chat_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn run_turn(&self, message: &InboundMessage) -> Result<TurnOutcome, AgentError> {
        let chat_id = message.chat_id.as_str();

        if let Err(e) = self.transport.send_typing(chat_id).await {
            tracing::debug!(chat_id = %chat_id, error = %e, "Typing indicator failed");
        }

        let record = self.gateway.get_state(chat_id, &message.contact).await?;
        let from = record.bot_data.state;
        tracing::debug!(chat_id = %chat_id, state = %from, "Processing message");

        let staged = self.stage_document(&record, message).await;
        let ctx = FlowContext {
            store: &self.store,
            catalog: &self.catalog,
        };
        let transition = handle_turn(ctx, &record, &message.body, staged.clone());

        if let Some(staged) = staged {
            if !transition.uploads.contains(&staged) {
                discard(&staged).await;
            }
        }

        let Transition {
            messages,
            patch,
            uploads,
            handoff,
        } = transition;
        let to = patch.target_state().unwrap_or(from);

        if !patch.is_empty() || !uploads.is_empty() {
            self.gateway.update_state(chat_id, &patch, uploads).await?;
        }
        if to != from {
            metrics::counter!(
                "zailo_bot_transitions_total",
                "from" => from.as_str(),
                "to" => to.as_str()
            )
            .increment(1);
            tracing::info!(
                chat_id = %chat_id,
                from = %from,
                to = %to,
                step = to.display_name(),
                "State transition"
            );
        }

        self.send_paced(chat_id, messages).await?;

        if let Some(status) = handoff {
            if let Err(e) = self.notifier.notify(chat_id, status).await {
                tracing::error!(chat_id = %chat_id, error = %e, "Sales notification failed");
            }
            self.gateway.reset_state(chat_id).await?;
            metrics::counter!("zailo_bot_handoffs_total", "state" => to.as_str()).increment(1);
        }

        Ok(TurnOutcome::Completed {
            from,
            to,
            handed_off: handoff.is_some(),
        })
    }

    /// Save attached media when the current step collects a document.
    ///
    /// A failed save is treated as "no media" so the step re-prompts.
    async fn stage_document(
        &self,
        record: &ClientRecord,
        message: &InboundMessage,
    ) -> Option<PendingUpload> {
        let media = message.media.as_ref()?;
        let field = record.bot_data.state.document_field()?;

        match self.documents.save(&message.chat_id, field, media).await {
            Ok(upload) => Some(upload),
            Err(e) => {
                tracing::warn!(
                    chat_id = %message.chat_id,
                    field = field.as_str(),
                    error = %e,
                    "Failed to stage document"
                );
                None
            },
        }
    }

    async fn send_paced(
        &self,
        chat_id: &str,
        messages: Vec<OutboundMessage>,
    ) -> Result<(), AgentError> {
        for (i, message) in messages.into_iter().enumerate() {
            if i > 0 && !self.config.pacing.is_zero() {
                tokio::time::sleep(self.config.pacing).await;
            }

            let is_media = matches!(message, OutboundMessage::Media { .. });
            match self.transport.send(chat_id, message).await {
                Ok(()) => {},
                // A vehicle photo that cannot be delivered does not break the turn
                Err(e) if is_media && !e.is_timeout() => {
                    tracing::warn!(chat_id = %chat_id, error = %e, "Failed to send media");
                },
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    async fn recover(&self, chat_id: &str, err: AgentError) -> TurnOutcome {
        let kind = err.kind();
        metrics::counter!("zailo_bot_errors_total", "kind" => kind).increment(1);
        tracing::error!(chat_id = %chat_id, error = %err, kind, "Turn failed, resetting conversation");

        let apology = if err.is_timeout() {
            messages::SLOW_SYSTEM
        } else {
            messages::GENERIC_ERROR
        };
        if let Err(e) = self
            .transport
            .send(chat_id, OutboundMessage::text(apology))
            .await
        {
            tracing::error!(chat_id = %chat_id, error = %e, "Failed to send apology");
        }

        if let Err(e) = self.gateway.reset_state(chat_id).await {
            tracing::error!(chat_id = %chat_id, error = %e, "Failed to reset conversation after error");
        }

        TurnOutcome::Failed { kind }
    }
}

async fn discard(upload: &PendingUpload) {
    if let Err(e) = tokio::fs::remove_file(&upload.path).await {
        tracing::debug!(path = %upload.path.display(), error = %e, "Failed to remove unused staged file");
    }
}
