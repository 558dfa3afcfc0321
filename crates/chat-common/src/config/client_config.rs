//! Client configuration
//!
//! Loads configuration from environment variables (and a `.env` file when
//! present) or builds it programmatically from a token.

use serde::Deserialize;
use std::env;
use std::fmt;
use std::time::Duration;

/// Main client configuration
#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    /// Bot token sent in the Authorization header and in Identify/Resume
    pub token: String,
    #[serde(default = "default_shard_count")]
    pub shard_count: u32,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Fixed gateway URL; when unset the URL is looked up over REST
    #[serde(default)]
    pub gateway_url: Option<String>,
    #[serde(default = "default_gateway_version")]
    pub gateway_version: u8,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    #[serde(default = "default_bucket_idle_secs")]
    pub bucket_idle_secs: u64,
    #[serde(default = "default_message_cache_size")]
    pub message_cache_size: usize,
    /// Raw gateway intent bits
    #[serde(default)]
    pub intents: Option<u64>,
}

// Default value functions
fn default_shard_count() -> u32 {
    1
}

fn default_api_url() -> String {
    "https://discordapp.com/api/v6".to_string()
}

fn default_gateway_version() -> u8 {
    6
}

fn default_reconnect_delay_ms() -> u64 {
    5000
}

fn default_bucket_idle_secs() -> u64 {
    300 // 5 minutes
}

fn default_message_cache_size() -> usize {
    1000
}

impl ClientConfig {
    /// Build a configuration with defaults for everything except the token
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            shard_count: default_shard_count(),
            api_url: default_api_url(),
            gateway_url: None,
            gateway_version: default_gateway_version(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            bucket_idle_secs: default_bucket_idle_secs(),
            message_cache_size: default_message_cache_size(),
            intents: None,
        }
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if `CHAT_TOKEN` is missing or a value is out of range
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    /// Returns an error if `CHAT_TOKEN` is missing or a value is out of range
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            token: lookup("CHAT_TOKEN")
                .filter(|s| !s.trim().is_empty())
                .ok_or(ConfigError::MissingVar("CHAT_TOKEN"))?,
            shard_count: lookup("CHAT_SHARD_COUNT")
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_shard_count),
            api_url: lookup("CHAT_API_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(default_api_url),
            gateway_url: lookup("CHAT_GATEWAY_URL").filter(|s| !s.is_empty()),
            gateway_version: lookup("CHAT_GATEWAY_VERSION")
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_gateway_version),
            reconnect_delay_ms: lookup("CHAT_RECONNECT_DELAY_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_reconnect_delay_ms),
            bucket_idle_secs: lookup("CHAT_BUCKET_IDLE_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_bucket_idle_secs),
            message_cache_size: lookup("CHAT_MESSAGE_CACHE_SIZE")
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_message_cache_size),
            intents: lookup("CHAT_INTENTS").and_then(|s| s.parse().ok()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns the first out-of-range setting
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::MissingVar("CHAT_TOKEN"));
        }
        if self.shard_count == 0 {
            return Err(ConfigError::InvalidValue(
                "CHAT_SHARD_COUNT",
                "must be at least 1".to_string(),
            ));
        }
        if self.bucket_idle_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "CHAT_BUCKET_IDLE_SECS",
                "must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_shard_count(mut self, shard_count: u32) -> Self {
        self.shard_count = shard_count;
        self
    }

    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    #[must_use]
    pub fn with_gateway_url(mut self, gateway_url: impl Into<String>) -> Self {
        self.gateway_url = Some(gateway_url.into());
        self
    }

    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn with_intents(mut self, intents: u64) -> Self {
        self.intents = Some(intents);
        self
    }

    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    #[must_use]
    pub fn bucket_idle(&self) -> Duration {
        Duration::from_secs(self.bucket_idle_secs)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("token", &"<redacted>")
            .field("shard_count", &self.shard_count)
            .field("api_url", &self.api_url)
            .field("gateway_url", &self.gateway_url)
            .field("gateway_version", &self.gateway_version)
            .field("reconnect_delay_ms", &self.reconnect_delay_ms)
            .field("bucket_idle_secs", &self.bucket_idle_secs)
            .field("message_cache_size", &self.message_cache_size)
            .field("intents", &self.intents)
            .finish()
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = ClientConfig::new("token");
        assert_eq!(config.shard_count, 1);
        assert_eq!(config.api_url, "https://discordapp.com/api/v6");
        assert_eq!(config.gateway_version, 6);
        assert_eq!(config.reconnect_delay(), Duration::from_secs(5));
        assert_eq!(config.bucket_idle(), Duration::from_secs(300));
        assert_eq!(config.message_cache_size, 1000);
        assert!(config.gateway_url.is_none());
        assert!(config.intents.is_none());
    }

    #[test]
    fn test_missing_token() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("CHAT_TOKEN")));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("CHAT_TOKEN", "abc"),
            ("CHAT_SHARD_COUNT", "4"),
            ("CHAT_API_URL", "http://localhost:9000/api/"),
            ("CHAT_GATEWAY_URL", "ws://localhost:9000/gateway"),
            ("CHAT_RECONNECT_DELAY_MS", "250"),
            ("CHAT_INTENTS", "513"),
        ]))
        .unwrap();

        assert_eq!(config.token, "abc");
        assert_eq!(config.shard_count, 4);
        assert_eq!(config.api_url, "http://localhost:9000/api");
        assert_eq!(config.gateway_url.as_deref(), Some("ws://localhost:9000/gateway"));
        assert_eq!(config.reconnect_delay_ms, 250);
        assert_eq!(config.intents, Some(513));
    }

    #[test]
    fn test_zero_shards_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[("CHAT_TOKEN", "abc"), ("CHAT_SHARD_COUNT", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("CHAT_SHARD_COUNT", _)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", ClientConfig::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
