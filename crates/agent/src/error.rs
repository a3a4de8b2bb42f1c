//! Agent errors

use thiserror::Error;

use zailo_bot_core::TransportError;
use zailo_bot_persistence::GatewayError;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl AgentError {
    /// Whether the turn was aborted by a slow backend or bridge
    pub fn is_timeout(&self) -> bool {
        match self {
            AgentError::Gateway(e) => e.is_timeout(),
            AgentError::Transport(e) => e.is_timeout(),
        }
    }

    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::Gateway(e) if e.is_timeout() => "gateway_timeout",
            AgentError::Gateway(_) => "gateway",
            AgentError::Transport(e) if e.is_timeout() => "transport_timeout",
            AgentError::Transport(_) => "transport",
        }
    }
}
