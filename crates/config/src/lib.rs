//! Configuration management for the chat-bot
//!
//! Supports loading configuration from:
//! - YAML files (`config/default.yaml`, `config/{env}.yaml`)
//! - Environment variables (ZAILO_BOT_ prefix, `__` separator)
//!
//! Store data is loaded separately at startup:
//! - store profile JSON (assistant name, store name, sales contacts), required
//! - vehicle catalog JSON, optional (an empty catalog is used when missing)

pub mod settings;
pub mod store;

pub use settings::{
    load_settings, BotConfig, GatewayConfig, ObservabilityConfig, RuntimeEnvironment,
    ServerConfig, Settings, TransportConfig,
};
pub use store::{load_catalog, SalesContact, StoreProfile};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
