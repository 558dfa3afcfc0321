//! Prepared requests, responses, and request preparation
//!
//! Every request carries the fixed user agent; all but unauthenticated ones
//! also carry the Authorization header.

use bitflags::bitflags;
use serde_json::Value;
use std::collections::HashMap;

use crate::endpoint::{Method, Route};
use crate::error::HttpError;

/// Fixed user agent sent with every request
pub const USER_AGENT: &str = concat!(
    "DiscordBot (chat-client, ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

bitflags! {
    /// Per-request options
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RequestFlags: u8 {
        /// Send without the Authorization header
        const UNAUTHENTICATED = 0x01;
    }
}

/// A fully prepared HTTP request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    /// JSON body
    pub body: Option<String>,
}

impl HttpRequest {
    /// Get a header value by name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A received HTTP response with its body fully read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Header names are stored lowercased
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    /// Create a response with no headers
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Get a header value by name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    #[inline]
    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }

    /// Parse the body as JSON; an empty body yields `None`
    pub fn json(&self) -> Result<Option<Value>, HttpError> {
        if self.body.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&self.body)?))
    }

    /// Parse the body of a successful response; other statuses become errors
    pub fn into_json(self) -> Result<Option<Value>, HttpError> {
        if !self.is_success() {
            return Err(HttpError::Status {
                status: self.status,
                body: self.body,
            });
        }
        self.json()
    }
}

/// Turns routes into prepared requests against one API base URL
#[derive(Clone)]
pub struct RequestFactory {
    base_url: String,
    token: String,
}

impl RequestFactory {
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the request for `route` with an optional JSON body
    pub fn prepare(&self, route: &Route, body: Option<&Value>, flags: RequestFlags) -> HttpRequest {
        let mut headers = Vec::with_capacity(3);
        if !flags.contains(RequestFlags::UNAUTHENTICATED) {
            headers.push(("Authorization", self.token.clone()));
        }
        headers.push(("User-Agent", USER_AGENT.to_string()));

        let body = body.map(Value::to_string);
        if body.is_some() {
            headers.push(("Content-Type", "application/json".to_string()));
        }

        HttpRequest {
            method: route.method,
            url: format!("{}{}", self.base_url, route.path),
            headers,
            body,
        }
    }
}

impl std::fmt::Debug for RequestFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestFactory")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::routes;
    use chat_core::Snowflake;
    use serde_json::json;

    #[test]
    fn test_authenticated_request_headers() {
        let factory = RequestFactory::new("https://example.test/api/v6/", "Bot abc");
        let request = factory.prepare(
            &routes::send_message(Snowflake::new(5)),
            Some(&json!({"content": "hi"})),
            RequestFlags::empty(),
        );

        assert_eq!(request.url, "https://example.test/api/v6/channels/5/messages");
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.header("authorization"), Some("Bot abc"));
        assert_eq!(request.header("User-Agent"), Some(USER_AGENT));
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.body.as_deref(), Some(r#"{"content":"hi"}"#));
    }

    #[test]
    fn test_unauthenticated_request_skips_token() {
        let factory = RequestFactory::new("https://example.test/api", "Bot abc");
        let request = factory.prepare(&routes::gateway(), None, RequestFlags::UNAUTHENTICATED);

        assert!(request.header("Authorization").is_none());
        assert!(request.header("User-Agent").is_some());
        assert!(request.body.is_none());
    }

    #[test]
    fn test_response_json() {
        let response = HttpResponse::new(200, r#"{"url":"wss://gateway.test"}"#);
        assert_eq!(
            response.into_json().unwrap(),
            Some(json!({"url": "wss://gateway.test"}))
        );

        assert_eq!(HttpResponse::new(204, "").into_json().unwrap(), None);
    }

    #[test]
    fn test_error_status_becomes_error() {
        let err = HttpResponse::new(404, r#"{"message":"Unknown Channel"}"#)
            .into_json()
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_response_headers_case_insensitive() {
        let response = HttpResponse::new(200, "").with_header("X-RateLimit-Remaining", "4");
        assert_eq!(response.header("x-ratelimit-remaining"), Some("4"));
        assert_eq!(response.header("X-RATELIMIT-REMAINING"), Some("4"));
    }
}
