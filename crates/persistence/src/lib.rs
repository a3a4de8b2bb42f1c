//! Persistence layer for the chat-bot
//!
//! Provides:
//! - `ClientGateway`: fetch/create/update the per-chat client record
//! - `HttpClientGateway`: the REST backend implementation (timeouts, create-on-404,
//!   JSON or multipart updates)
//! - `InMemoryClientGateway`: same contract held in memory, for tests and dry runs
//! - `DocumentStore`: local staging of received media before upload

pub mod documents;
pub mod error;
pub mod gateway;
pub mod http;
pub mod memory;

pub use documents::DocumentStore;
pub use error::{DocumentError, GatewayError};
pub use gateway::ClientGateway;
pub use http::{HttpClientGateway, HttpGatewayConfig};
pub use memory::InMemoryClientGateway;
