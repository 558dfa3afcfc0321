//! Client facade

use chat_common::ClientConfig;
use chat_core::{
    BroadcastSink, Channel, EntityStore, Event, Guild, MemoryEntityStore, Snowflake, StoreExt, User,
};
use chat_gateway::protocol::Activity;
use chat_gateway::{ActivityType, GatewayUrl, PresenceUpdatePayload, ShardRegistry, Status};
use chat_http::{HttpTransport, ImmediateClient, RateLimitedDispatcher, RequestFactory, ReqwestTransport, RestClient};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use crate::error::ClientResult;

/// Timeout for a single REST request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Events buffered per subscriber before it starts lagging
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Builder for [`Client`]
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn HttpTransport>>,
    store: Option<Arc<dyn EntityStore>>,
    event_capacity: usize,
}

impl ClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            store: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Use a custom HTTP transport instead of `reqwest`
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a custom entity store instead of the in-memory one
    pub fn store(mut self, store: Arc<dyn EntityStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    pub fn build(self) -> ClientResult<Client> {
        let Self {
            config,
            transport,
            store,
            event_capacity,
        } = self;
        config.validate()?;

        let transport: Arc<dyn HttpTransport> = match transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(REQUEST_TIMEOUT)?),
        };
        let factory = RequestFactory::new(config.api_url.clone(), config.token.clone());

        let dispatcher = RateLimitedDispatcher::new(factory.clone(), Arc::clone(&transport), config.bucket_idle());
        let rest = RestClient::new(Arc::new(dispatcher));

        // The gateway lookup happens before any bucket state exists
        let lookup = RestClient::new(Arc::new(ImmediateClient::new(factory, transport)));
        let url = Arc::new(GatewayUrl::from_config(&config, lookup));

        let store: Arc<dyn EntityStore> = match store {
            Some(store) => store,
            None => MemoryEntityStore::new_shared(config.message_cache_size),
        };
        let events = Arc::new(BroadcastSink::new(event_capacity));
        let shards = ShardRegistry::new(&config, url, Arc::clone(&store), events.clone());

        tracing::debug!(shards = shards.len(), api_url = %config.api_url, "Client built");

        Ok(Client {
            config,
            rest,
            store,
            events,
            shards,
            presence: Mutex::new(PresenceUpdatePayload::new(Status::Online, None, None)),
        })
    }
}

/// Chat platform client
pub struct Client {
    config: ClientConfig,
    rest: RestClient,
    store: Arc<dyn EntityStore>,
    events: Arc<BroadcastSink>,
    shards: ShardRegistry,
    presence: Mutex<PresenceUpdatePayload>,
}

impl Client {
    /// Build a client with the default transport and store
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        ClientBuilder::new(config).build()
    }

    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    /// Build a client from `CHAT_*` environment variables
    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // =========================================================================
    // Connection
    // =========================================================================

    /// Connect every shard
    pub async fn connect(&self) -> ClientResult<()> {
        tracing::info!(shards = self.shards.len(), "Connecting client");
        self.shards.connect().await?;
        Ok(())
    }

    /// Disconnect every shard
    pub fn disconnect(&self) {
        tracing::info!("Disconnecting client");
        self.shards.disconnect();
    }

    pub fn shards(&self) -> &ShardRegistry {
        &self.shards
    }

    // =========================================================================
    // Cache lookups
    // =========================================================================

    pub fn guild(&self, guild_id: Snowflake) -> Option<Guild> {
        self.shards.guild(guild_id)
    }

    pub fn guilds(&self) -> Vec<Guild> {
        self.shards.guilds()
    }

    pub fn channel(&self, channel_id: Snowflake) -> Option<Channel> {
        self.store.channel(channel_id)
    }

    pub fn user(&self, user_id: Snowflake) -> Option<User> {
        self.store.user(user_id)
    }

    /// The connected user, once a shard has seen READY
    pub fn current_user(&self) -> Option<User> {
        self.shards
            .shards()
            .iter()
            .find_map(|shard| shard.dispatcher().current_user())
            .and_then(|id| self.store.user(id))
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    // =========================================================================
    // Presence
    // =========================================================================

    /// Current presence
    pub fn presence(&self) -> PresenceUpdatePayload {
        self.presence.lock().clone()
    }

    /// Change the online status on every shard
    pub fn set_status(&self, status: Status) -> ClientResult<()> {
        let presence = {
            let mut presence = self.presence.lock();
            presence.status = status;
            presence.clone()
        };
        self.broadcast_presence(&presence)
    }

    /// Change the activity on every shard; `None` clears it
    pub fn set_activity(&self, activity: Option<(ActivityType, String)>) -> ClientResult<()> {
        let presence = {
            let mut presence = self.presence.lock();
            presence.game = activity.map(|(kind, name)| Activity { kind, name });
            presence.clone()
        };
        self.broadcast_presence(&presence)
    }

    fn broadcast_presence(&self, presence: &PresenceUpdatePayload) -> ClientResult<()> {
        tracing::debug!(status = ?presence.status, "Updating presence");
        self.shards.set_presence(presence)?;
        Ok(())
    }

    // =========================================================================
    // REST and events
    // =========================================================================

    /// Rate-limited REST operations
    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    /// Subscribe to domain events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("shards", &self.shards.len())
            .finish_non_exhaustive()
    }
}
