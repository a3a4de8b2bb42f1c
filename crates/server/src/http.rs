//! HTTP Endpoints
//!
//! Webhooks called by the WhatsApp bridge and health checks.

use axum::{
    extract::{Json, State},
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use zailo_bot_core::{ContactInfo, InboundMessage, MediaAttachment};

use crate::metrics::{metrics_handler, record_webhook};
use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.config.server.cors_origins,
        state.config.server.cors_enabled,
    );

    Router::new()
        .route("/webhook/messages", post(inbound_message))
        .route("/webhook/status", post(connection_status))
        .route("/logout", post(logout))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::info!("No valid CORS origins configured, defaulting to localhost:3001");
        return CorsLayer::new()
            .allow_origin(HeaderValue::from_static("http://localhost:3001"))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Inbound chat event as posted by the bridge
#[derive(Debug, Deserialize)]
pub struct InboundPayload {
    pub from: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub from_me: bool,
    #[serde(default)]
    pub push_name: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub media: Option<MediaPayload>,
}

#[derive(Debug, Deserialize)]
pub struct MediaPayload {
    pub mimetype: String,
    /// Base64 file content
    pub data: String,
}

impl InboundPayload {
    fn into_message(self) -> Result<InboundMessage, ServerError> {
        let media = match self.media {
            Some(media) => {
                let data = STANDARD
                    .decode(media.data.trim())
                    .map_err(|e| ServerError::InvalidRequest(format!("media.data: {}", e)))?;
                Some(MediaAttachment::new(media.mimetype, data))
            },
            None => None,
        };

        let number = self
            .number
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.from.split('@').next().unwrap_or_default().to_string());

        Ok(InboundMessage {
            chat_id: self.from,
            body: self.body,
            from_me: self.from_me,
            contact: ContactInfo {
                push_name: self.push_name.filter(|n| !n.is_empty()),
                number,
            },
            media,
        })
    }
}

/// Accept an inbound message and queue its turn.
///
/// The bridge only needs to know the event was taken; replies go out
/// through the transport. Queueing happens before the response, so
/// messages of one chat are processed in the order they were posted.
async fn inbound_message(
    State(state): State<AppState>,
    Json(payload): Json<InboundPayload>,
) -> Result<impl IntoResponse, ServerError> {
    record_webhook("messages");
    let message = payload.into_message()?;
    state.engine.enqueue(message);

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "accepted": true })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    pub ready: bool,
    #[serde(default)]
    pub phone_number: Option<String>,
}

async fn connection_status(
    State(state): State<AppState>,
    Json(payload): Json<StatusPayload>,
) -> Result<Json<serde_json::Value>, ServerError> {
    record_webhook("status");

    if payload.ready {
        let phone = payload
            .phone_number
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ServerError::InvalidRequest("phone_number is required".to_string()))?;
        state.engine.on_connected(&phone).await;
    } else {
        state.engine.on_disconnected().await;
    }

    Ok(Json(serde_json::json!({ "ready": state.is_ready() })))
}

async fn logout(State(state): State<AppState>) -> Json<serde_json::Value> {
    record_webhook("logout");
    state.engine.on_disconnected().await;
    Json(serde_json::json!({ "ready": false }))
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "store": state.engine.store().store_name,
        "vehicles": state.engine.catalog().len(),
    }))
}

/// 503 until the bridge reports a connected session
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let ready = state.is_ready();
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(serde_json::json!({
            "ready": ready,
            "active_chats": state.engine.active_chats(),
        })),
    )
}
