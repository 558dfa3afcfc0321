//! Shard registry
//!
//! Holds one [`GatewaySession`] per shard. Every guild lives on exactly one
//! shard, so lookups scan the shards' guild sets.

use chat_common::ClientConfig;
use chat_core::{EntityStore, EventSink, Guild, Snowflake, StoreExt};
use std::sync::Arc;

use crate::connection::{GatewaySession, SessionState};
use crate::error::GatewayResult;
use crate::protocol::PresenceUpdatePayload;
use crate::url::GatewayUrl;

/// All shards of one client
pub struct ShardRegistry {
    shards: Vec<Arc<GatewaySession>>,
    store: Arc<dyn EntityStore>,
}

impl ShardRegistry {
    /// Create `config.shard_count` sessions sharing `url`, `store` and `sink`
    pub fn new(
        config: &ClientConfig,
        url: Arc<GatewayUrl>,
        store: Arc<dyn EntityStore>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let shards = (0..config.shard_count.max(1))
            .map(|shard_id| GatewaySession::new(shard_id, config, url.clone(), store.clone(), sink.clone()))
            .collect();
        Self { shards, store }
    }

    pub fn len(&self) -> usize {
        self.shards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    pub fn shard(&self, shard_id: u32) -> Option<&Arc<GatewaySession>> {
        self.shards.get(shard_id as usize)
    }

    pub fn shards(&self) -> &[Arc<GatewaySession>] {
        &self.shards
    }

    /// Connect every shard in order
    ///
    /// Later shards are still attempted after a failure; the first error is
    /// returned.
    pub async fn connect(&self) -> GatewayResult<()> {
        let mut first_error = None;
        for shard in &self.shards {
            if let Err(e) = shard.connect().await {
                tracing::error!(shard_id = shard.shard_id(), error = %e, "Shard failed to connect");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Disconnect every shard
    pub fn disconnect(&self) {
        for shard in &self.shards {
            shard.disconnect();
        }
        tracing::info!(shards = self.shards.len(), "Shards disconnected");
    }

    /// Shard that owns `guild_id`
    pub fn shard_for_guild(&self, guild_id: Snowflake) -> Option<&Arc<GatewaySession>> {
        self.shards.iter().find(|shard| shard.has_guild(guild_id))
    }

    /// Cached guild, if one of the shards owns it
    pub fn guild(&self, guild_id: Snowflake) -> Option<Guild> {
        self.shard_for_guild(guild_id)?;
        self.store.guild(guild_id)
    }

    /// Every cached guild across all shards
    pub fn guilds(&self) -> Vec<Guild> {
        self.shards
            .iter()
            .flat_map(|shard| shard.guild_ids())
            .filter_map(|guild_id| self.store.guild(guild_id))
            .collect()
    }

    /// Send the same presence on every shard
    ///
    /// Every shard is attempted; the first error is returned.
    pub fn set_presence(&self, presence: &PresenceUpdatePayload) -> GatewayResult<()> {
        let mut first_error = None;
        for shard in &self.shards {
            if let Err(e) = shard.set_presence(presence) {
                tracing::warn!(shard_id = shard.shard_id(), error = %e, "Presence update failed");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// State of every shard, indexed by shard id
    pub fn states(&self) -> Vec<SessionState> {
        self.shards.iter().map(|shard| shard.state()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Outbound;
    use crate::error::GatewayError;
    use crate::handlers::tests::guild_payload;
    use crate::protocol::{ActivityType, Status};
    use chat_core::{CollectingSink, MemoryEntityStore};
    use chat_http::{ImmediateClient, RequestFactory, ReqwestTransport, RestClient};
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn registry(config: &ClientConfig, gateway: &str) -> (ShardRegistry, Arc<MemoryEntityStore>) {
        let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(1)).unwrap());
        let http = ImmediateClient::new(RequestFactory::new("https://api.invalid", "secret"), transport);
        let url = Arc::new(GatewayUrl::new(RestClient::new(Arc::new(http)), Some(gateway.into()), 6));
        let store = Arc::new(MemoryEntityStore::default());
        let registry = ShardRegistry::new(config, url, store.clone(), Arc::new(CollectingSink::new()));
        (registry, store)
    }

    #[tokio::test]
    async fn test_guild_lookup_scans_shards() {
        let config = ClientConfig::new("secret").with_shard_count(2);
        let (registry, _store) = registry(&config, "ws://127.0.0.1:9");
        assert_eq!(registry.len(), 2);

        let shard = registry.shard(1).unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        let generation = shard.attach_opened(tx);
        let frame = json!({"op": 0, "s": 1, "t": "GUILD_CREATE", "d": guild_payload()});
        shard.on_text(generation, &frame.to_string());

        assert_eq!(registry.shard_for_guild(Snowflake::new(1)).unwrap().shard_id(), 1);
        assert_eq!(registry.guild(Snowflake::new(1)).unwrap().name, "Test Guild");
        assert_eq!(registry.guilds().len(), 1);
        assert!(registry.guild(Snowflake::new(2)).is_none());
    }

    #[tokio::test]
    async fn test_presence_broadcast() {
        let config = ClientConfig::new("secret").with_shard_count(2);
        let (registry, _store) = registry(&config, "ws://127.0.0.1:9");

        let mut receivers = Vec::new();
        for shard in registry.shards() {
            let (tx, rx) = mpsc::unbounded_channel();
            shard.attach_opened(tx);
            receivers.push(rx);
        }

        let presence = PresenceUpdatePayload::new(Status::Online, Some(ActivityType::Playing), Some("chess".into()));
        registry.set_presence(&presence).unwrap();

        for rx in &mut receivers {
            let Ok(Outbound::Text(text)) = rx.try_recv() else {
                panic!("expected a presence frame");
            };
            let frame: serde_json::Value = serde_json::from_str(&text).unwrap();
            assert_eq!(frame["op"], 3);
            assert_eq!(frame["d"]["game"], json!({"type": 0, "name": "chess"}));
        }
    }

    #[tokio::test]
    async fn test_presence_reports_first_failure() {
        let config = ClientConfig::new("secret").with_shard_count(2);
        let (registry, _store) = registry(&config, "ws://127.0.0.1:9");
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.shard(1).unwrap().attach_opened(tx);

        let presence = PresenceUpdatePayload::new(Status::Idle, None, None);
        assert!(matches!(registry.set_presence(&presence), Err(GatewayError::NotConnected)));
        // Shard 1 still received it
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_connect_failure_is_reported() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = ClientConfig::new("secret");
        let (registry, _store) = registry(&config, &format!("ws://127.0.0.1:{port}"));

        let result = registry.connect().await;
        assert!(matches!(result, Err(GatewayError::Connect { attempts: 3, .. })));
        assert_eq!(registry.states(), vec![SessionState::Disconnected]);
    }

    #[tokio::test]
    async fn test_disconnect_all() {
        let config = ClientConfig::new("secret").with_shard_count(3);
        let (registry, _store) = registry(&config, "ws://127.0.0.1:9");
        let (tx, _rx) = mpsc::unbounded_channel();
        registry.shard(0).unwrap().attach_opened(tx);

        registry.disconnect();
        assert_eq!(
            registry.states(),
            vec![
                SessionState::Disconnecting,
                SessionState::Disconnected,
                SessionState::Disconnected
            ]
        );
    }
}
