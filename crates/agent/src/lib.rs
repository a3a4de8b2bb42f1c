//! Dialogue engine for the dealership chat-bot
//!
//! Features:
//! - Vehicle lookup over the static catalog
//! - Pure per-state transition function (`advance`) producing replies, a
//!   record patch and document uploads
//! - Turn orchestration with per-chat locking, paced replies and error
//!   recovery
//! - Sales-team notification on handoff

pub mod catalog;
pub mod engine;
pub mod error;
pub mod flow;
pub mod messages;
pub mod notify;

pub use catalog::{price_value, Catalog};
pub use engine::{DialogueEngine, EngineConfig, TurnOutcome};
pub use error::AgentError;
pub use flow::{advance, handle_turn, FlowContext, Transition, TurnInput};
pub use notify::SalesNotifier;
