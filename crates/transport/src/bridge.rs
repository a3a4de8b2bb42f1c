//! WhatsApp bridge transport
//!
//! The bridge process keeps the WhatsApp Web session and exposes:
//! - `POST /messages` `{ chat_id, message: { type: "text", text } | { type: "media", url, caption } }`
//! - `POST /typing` `{ chat_id }`

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use zailo_bot_core::{MessageTransport, OutboundMessage, TransportError};

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3001".to_string(),
            timeout: Duration::from_secs(8),
        }
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    chat_id: &'a str,
    message: &'a OutboundMessage,
}

#[derive(Serialize)]
struct TypingRequest<'a> {
    chat_id: &'a str,
}

pub struct WhatsAppBridge {
    client: Client,
    config: BridgeConfig,
}

impl WhatsAppBridge {
    pub fn new(config: BridgeConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<(), TransportError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(map_reqwest)?;

        let status = response.status();
        if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            return Err(TransportError::NotConnected);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

fn map_reqwest(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Request(err.to_string())
    }
}

#[async_trait]
impl MessageTransport for WhatsAppBridge {
    async fn send(&self, chat_id: &str, message: OutboundMessage) -> Result<(), TransportError> {
        self.post("/messages", &SendRequest { chat_id, message: &message })
            .await
    }

    async fn send_typing(&self, chat_id: &str) -> Result<(), TransportError> {
        self.post("/typing", &TypingRequest { chat_id }).await
    }

    fn name(&self) -> &str {
        "whatsapp_bridge"
    }
}
