//! REST backend gateway
//!
//! Endpoints used:
//! - `GET  /api/clients/{chat_id}`: fetch (404 when the chat is new)
//! - `POST /api/clients`: create a seeded record
//! - `PUT  /api/clients/{chat_id}`: replace with the merged record; JSON, or
//!   multipart with a `payload` JSON part plus one file part per document
//! - `POST /api/bot/login-status`, `POST /api/bot/logout-status`: lifecycle pings

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;

use zailo_bot_core::{ClientRecord, ContactInfo, PendingUpload, RecordPatch};

use crate::{ClientGateway, GatewayError};

/// Configuration for the HTTP gateway
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    pub base_url: String,
    /// Budget for every request
    pub timeout: Duration,
    /// Sent as a bearer token when set
    pub api_key: Option<String>,
}

impl Default for HttpGatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout: Duration::from_secs(8),
            api_key: None,
        }
    }
}

/// Client record gateway backed by the REST API
pub struct HttpClientGateway {
    client: Client,
    config: HttpGatewayConfig,
}

impl HttpClientGateway {
    pub fn new(config: HttpGatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn client_url(&self, chat_id: &str) -> String {
        self.url(&format!("/api/clients/{}", chat_id))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Turn a non-2xx response into `GatewayError::Api`
    async fn check(response: Response) -> Result<Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::Api {
            status: status.as_u16(),
            body,
        })
    }

    /// Decode a record, accepting both a bare record and `{ "client": record }`
    async fn decode_record(response: Response) -> Result<ClientRecord, GatewayError> {
        let value: Value = response.json().await?;
        let value = match value {
            Value::Object(mut map) if map.get("client").map_or(false, Value::is_object) => {
                map.remove("client").unwrap_or_default()
            },
            other => other,
        };
        serde_json::from_value(value).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    async fn create(&self, seed: &ClientRecord) -> Result<ClientRecord, GatewayError> {
        let response = self
            .authorize(self.client.post(self.url("/api/clients")))
            .json(seed)
            .send()
            .await?;
        Self::decode_record(Self::check(response).await?).await
    }

    async fn put_json(&self, record: &ClientRecord) -> Result<ClientRecord, GatewayError> {
        let response = self
            .authorize(self.client.put(self.client_url(&record.chat_id)))
            .json(record)
            .send()
            .await?;
        Self::decode_record(Self::check(response).await?).await
    }

    async fn put_multipart(
        &self,
        record: &ClientRecord,
        uploads: &[PendingUpload],
    ) -> Result<ClientRecord, GatewayError> {
        let payload =
            serde_json::to_string(record).map_err(|e| GatewayError::Decode(e.to_string()))?;
        let mut form = Form::new().text("payload", payload);

        for upload in uploads {
            let bytes = tokio::fs::read(&upload.path).await?;
            let part = Part::bytes(bytes)
                .file_name(upload.file_name())
                .mime_str(&upload.mime_type)
                .map_err(|e| GatewayError::Request(format!("Invalid MIME type: {}", e)))?;
            form = form.part(upload.field.as_str(), part);
        }

        let response = self
            .authorize(self.client.put(self.client_url(&record.chat_id)))
            .multipart(form)
            .send()
            .await?;
        Self::decode_record(Self::check(response).await?).await
    }

    async fn remove_staged(uploads: &[PendingUpload]) {
        for upload in uploads {
            if let Err(e) = tokio::fs::remove_file(&upload.path).await {
                tracing::warn!(
                    path = %upload.path.display(),
                    error = %e,
                    "Failed to remove staged document after upload"
                );
            }
        }
    }
}

#[async_trait]
impl ClientGateway for HttpClientGateway {
    async fn get_state(
        &self,
        chat_id: &str,
        contact: &ContactInfo,
    ) -> Result<ClientRecord, GatewayError> {
        if let Some(record) = self.find(chat_id).await? {
            return Ok(record);
        }

        tracing::info!(chat_id = %chat_id, "Client not found, creating record");
        let seed = ClientRecord::seed(chat_id, contact.push_name.as_deref(), &contact.number);
        self.create(&seed).await
    }

    async fn find(&self, chat_id: &str) -> Result<Option<ClientRecord>, GatewayError> {
        let response = self
            .authorize(self.client.get(self.client_url(chat_id)))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::decode_record(Self::check(response).await?)
            .await
            .map(Some)
    }

    async fn update_state(
        &self,
        chat_id: &str,
        patch: &RecordPatch,
        uploads: Vec<PendingUpload>,
    ) -> Result<ClientRecord, GatewayError> {
        let mut record = self.find(chat_id).await?.ok_or_else(|| GatewayError::Api {
            status: StatusCode::NOT_FOUND.as_u16(),
            body: format!("client {} not found", chat_id),
        })?;
        patch.apply_to(&mut record, Utc::now());

        let updated = if uploads.is_empty() {
            self.put_json(&record).await?
        } else {
            let updated = self.put_multipart(&record, &uploads).await?;
            Self::remove_staged(&uploads).await;
            updated
        };

        tracing::debug!(
            chat_id = %chat_id,
            state = %updated.bot_data.state,
            uploads = uploads.len(),
            "Client record updated"
        );
        Ok(updated)
    }

    async fn report_login(&self, phone_number: &str) -> Result<(), GatewayError> {
        let response = self
            .authorize(self.client.post(self.url("/api/bot/login-status")))
            .json(&serde_json::json!({ "phoneNumber": phone_number }))
            .send()
            .await?;
        Self::check(response).await.map(|_| ())
    }

    async fn report_logout(&self) -> Result<(), GatewayError> {
        let response = self
            .authorize(self.client.post(self.url("/api/bot/logout-status")))
            .send()
            .await?;
        Self::check(response).await.map(|_| ())
    }

    fn name(&self) -> &str {
        "http"
    }
}
