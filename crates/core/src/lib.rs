//! Core types and traits for the dealership chat-bot
//!
//! This crate provides the types shared by every other crate:
//! - Dialogue states and their wire tags
//! - The persisted client record and its `bot_data` sub-object
//! - Typed record patches with shallow-merge semantics
//! - Inbound/outbound message types
//! - The messaging transport trait
//! - Error types

pub mod document;
pub mod error;
pub mod message;
pub mod patch;
pub mod record;
pub mod state;
pub mod traits;

pub use document::{DocumentField, PendingUpload};
pub use error::{CoreError, TransportError};
pub use message::{ContactInfo, InboundMessage, MediaAttachment, OutboundMessage};
pub use patch::{BotDataPatch, RecordPatch};
pub use record::{
    BotData, ClientRecord, DealType, FinancingDetails, HistoryEntry, PaymentMethod, Price,
    TradeInCar, Vehicle,
};
pub use state::DialogueState;
pub use traits::MessageTransport;
