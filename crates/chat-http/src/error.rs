//! HTTP layer errors

use thiserror::Error;

use chat_core::DomainError;

/// Errors surfaced to REST callers
#[derive(Debug, Error)]
pub enum HttpError {
    /// The request never produced a response (connect, TLS, body read)
    #[error("HTTP transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected response payload: {0}")]
    Domain(#[from] DomainError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The bucket worker went away before answering
    #[error("Rate limit worker dropped the request")]
    WorkerDropped,
}

impl HttpError {
    /// Status code, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this is a 404 answer
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
