//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use zailo_bot_agent::DialogueEngine;
use zailo_bot_config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DialogueEngine>,
    pub config: Arc<Settings>,
}

impl AppState {
    pub fn new(engine: Arc<DialogueEngine>, config: Settings) -> Self {
        Self {
            engine,
            config: Arc::new(config),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_ready()
    }
}
