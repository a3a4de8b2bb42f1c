//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation
    #[default]
    Development,
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if strict validation should be applied
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Webhook server
    #[serde(default)]
    pub server: ServerConfig,

    /// Client record backend
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// WhatsApp bridge
    #[serde(default)]
    pub transport: TransportConfig,

    /// Dialogue behavior and store data paths
    #[serde(default)]
    pub bot: BotConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_gateway()?;
        self.validate_transport()?;
        self.validate_bot()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }
        Ok(())
    }

    fn validate_gateway(&self) -> Result<(), ConfigError> {
        let gateway = &self.gateway;

        if gateway.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("gateway.base_url".to_string()));
        }

        if !(100..=60_000).contains(&gateway.timeout_ms) {
            return Err(ConfigError::InvalidValue {
                field: "gateway.timeout_ms".to_string(),
                message: format!("Must be between 100 and 60000, got {}", gateway.timeout_ms),
            });
        }

        if self.environment.is_strict() && gateway.api_key.is_none() {
            return Err(ConfigError::MissingField("gateway.api_key".to_string()));
        }

        Ok(())
    }

    fn validate_transport(&self) -> Result<(), ConfigError> {
        let transport = &self.transport;

        if transport.bridge_url.trim().is_empty() {
            return Err(ConfigError::MissingField("transport.bridge_url".to_string()));
        }

        if !(100..=60_000).contains(&transport.timeout_ms) {
            return Err(ConfigError::InvalidValue {
                field: "transport.timeout_ms".to_string(),
                message: format!(
                    "Must be between 100 and 60000, got {}",
                    transport.timeout_ms
                ),
            });
        }

        Ok(())
    }

    fn validate_bot(&self) -> Result<(), ConfigError> {
        let bot = &self.bot;

        if bot.pacing_ms > 10_000 {
            return Err(ConfigError::InvalidValue {
                field: "bot.pacing_ms".to_string(),
                message: "Pacing too high (maximum 10000ms)".to_string(),
            });
        }

        if bot.chat_suffix.is_empty() {
            return Err(ConfigError::MissingField("bot.chat_suffix".to_string()));
        }

        if bot.store_profile_path.trim().is_empty() {
            return Err(ConfigError::MissingField("bot.store_profile_path".to_string()));
        }

        Ok(())
    }
}

/// Webhook server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: true,
            cors_origins: Vec::new(),
        }
    }
}

/// Client record backend (REST)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_url")]
    pub base_url: String,

    /// Per-request budget
    #[serde(default = "default_gateway_timeout_ms")]
    pub timeout_ms: u64,

    /// Sent as a bearer token when set
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_gateway_url() -> String {
    "http://127.0.0.1:5000".to_string()
}
fn default_gateway_timeout_ms() -> u64 {
    8_000
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_gateway_url(),
            timeout_ms: default_gateway_timeout_ms(),
            api_key: None,
        }
    }
}

/// WhatsApp bridge (HTTP)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_bridge_url")]
    pub bridge_url: String,

    #[serde(default = "default_transport_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_bridge_url() -> String {
    "http://127.0.0.1:3001".to_string()
}
fn default_transport_timeout_ms() -> u64 {
    8_000
}

impl TransportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            bridge_url: default_bridge_url(),
            timeout_ms: default_transport_timeout_ms(),
        }
    }
}

/// Dialogue behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Delay between consecutive outbound messages of one turn
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,

    /// Local staging directory for received documents
    #[serde(default = "default_documents_dir")]
    pub documents_dir: String,

    #[serde(default = "default_store_profile_path")]
    pub store_profile_path: String,

    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Only chats whose id ends with this suffix are answered
    #[serde(default = "default_chat_suffix")]
    pub chat_suffix: String,
}

fn default_pacing_ms() -> u64 {
    500
}
fn default_documents_dir() -> String {
    "documents".to_string()
}
fn default_store_profile_path() -> String {
    "config/store.json".to_string()
}
fn default_catalog_path() -> String {
    "config/catalog.json".to_string()
}
fn default_chat_suffix() -> String {
    "@c.us".to_string()
}

impl BotConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            pacing_ms: default_pacing_ms(),
            documents_dir: default_documents_dir(),
            store_profile_path: default_store_profile_path(),
            catalog_path: default_catalog_path(),
            chat_suffix: default_chat_suffix(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from files and environment
///
/// Priority (highest first):
/// 1. Environment variables (ZAILO_BOT_ prefix)
/// 2. config/{env}.yaml (if env specified)
/// 3. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("ZAILO_BOT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
