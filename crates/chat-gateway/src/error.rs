//! Gateway error types

use thiserror::Error;

/// Errors raised while inflating a compressed frame
#[derive(Debug, Error)]
pub enum CodecError {
    /// The zlib stream is corrupt
    #[error("Inflate failed: {0}")]
    Inflate(#[from] flate2::DecompressError),

    /// The inflated message is not UTF-8
    #[error("Inflated message is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Gateway error type
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Gateway URL lookup failed
    #[error("Could not resolve gateway url: {0}")]
    Url(#[from] chat_http::HttpError),

    /// Gateway URL is not a valid absolute URL
    #[error("Invalid gateway url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Opening the socket failed on every attempt
    #[error("Could not connect to {url} after {attempts} attempts: {reason}")]
    Connect {
        url: String,
        attempts: u32,
        reason: String,
    },

    /// No socket is open
    #[error("Not connected")]
    NotConnected,

    /// Payload could not be encoded
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Compressed frame could not be decoded
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Gateway result type
pub type GatewayResult<T> = Result<T, GatewayError>;
