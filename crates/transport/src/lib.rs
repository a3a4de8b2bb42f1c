//! Messaging transports
//!
//! - `WhatsAppBridge`: delivers messages through the HTTP bridge that owns
//!   the WhatsApp Web session
//! - `RecordingTransport`: keeps every outbound message in memory

pub mod bridge;
pub mod recording;

pub use bridge::{BridgeConfig, WhatsAppBridge};
pub use recording::{RecordingTransport, SentMessage};
