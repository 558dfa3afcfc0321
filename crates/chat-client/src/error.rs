//! Client error type

use chat_common::ConfigError;
use chat_gateway::GatewayError;
use chat_http::HttpError;
use thiserror::Error;

/// Errors surfaced by [`Client`](crate::Client)
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ClientError {
    /// Whether the gateway had no open socket
    pub fn is_not_connected(&self) -> bool {
        matches!(self, Self::Gateway(GatewayError::NotConnected))
    }
}

/// Client result type
pub type ClientResult<T> = Result<T, ClientError>;
