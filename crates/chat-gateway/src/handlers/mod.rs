//! Dispatch handlers
//!
//! Routes op 0 dispatches by event name to the handler for that event. Each
//! handler mutates the entity store and publishes domain events; effects on
//! the session itself are returned as [`Followup`]s.

mod channel;
mod guild;
mod member;
mod message;
mod role;

use chat_core::{DomainError, Entity, EntityKey, EntityStore, Event, EventSink, Refresh, Snowflake, StoreExt, User};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

use crate::events::{GatewayEventType, ReadyEvent};

/// Handler result type
pub type HandlerResult<T> = Result<T, DomainError>;

/// Session-level effect of a dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Followup {
    /// READY: a new session was established
    Ready { session_id: String },
    /// RESUMED: the previous session was replayed
    Resumed,
    /// The guild now belongs to this shard
    GuildAvailable(Snowflake),
    /// The guild left this shard
    GuildRemoved(Snowflake),
    /// Ask the gateway for the full member list of a large guild
    RequestMembers(Snowflake),
}

/// Dispatch table for one shard
pub struct Dispatcher {
    shard_id: u32,
    store: Arc<dyn EntityStore>,
    sink: Arc<dyn EventSink>,
    /// Current user, learned from READY
    me: Mutex<Option<Snowflake>>,
}

impl Dispatcher {
    pub fn new(shard_id: u32, store: Arc<dyn EntityStore>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            shard_id,
            store,
            sink,
            me: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    pub fn sink(&self) -> &Arc<dyn EventSink> {
        &self.sink
    }

    /// Id of the connected user, once READY has been seen
    pub fn current_user(&self) -> Option<Snowflake> {
        *self.me.lock()
    }

    /// Handle one dispatch
    ///
    /// Unknown event names are logged and ignored.
    pub fn dispatch(&self, name: &str, data: &Value) -> HandlerResult<Vec<Followup>> {
        let Some(event) = GatewayEventType::from_str(name) else {
            tracing::warn!(shard_id = self.shard_id, event = %name, "Unknown dispatch event");
            return Ok(Vec::new());
        };

        if event.is_ignored() {
            tracing::trace!(shard_id = self.shard_id, event = %event, "Ignoring dispatch");
            return Ok(Vec::new());
        }

        tracing::debug!(shard_id = self.shard_id, event = %event, "Dispatch");

        match event {
            GatewayEventType::Ready => self.ready(data),
            GatewayEventType::Resumed => Ok(vec![Followup::Resumed]),

            GatewayEventType::ChannelCreate => self.channel_create(data).map(none),
            GatewayEventType::ChannelUpdate => self.channel_update(data).map(none),
            GatewayEventType::ChannelDelete => self.channel_delete(data).map(none),

            GatewayEventType::GuildCreate => self.guild_create(data),
            GatewayEventType::GuildUpdate => self.guild_update(data).map(none),
            GatewayEventType::GuildDelete => self.guild_delete(data),
            GatewayEventType::GuildEmojisUpdate => self.guild_emojis_update(data).map(none),

            GatewayEventType::GuildMemberAdd => self.member_add(data).map(none),
            GatewayEventType::GuildMemberUpdate => self.member_update(data).map(none),
            GatewayEventType::GuildMemberRemove => self.member_remove(data).map(none),
            GatewayEventType::GuildMembersChunk => self.members_chunk(data).map(none),

            GatewayEventType::GuildRoleCreate => self.role_create(data).map(none),
            GatewayEventType::GuildRoleUpdate => self.role_update(data).map(none),
            GatewayEventType::GuildRoleDelete => self.role_delete(data).map(none),

            GatewayEventType::MessageCreate => self.message_create(data).map(none),
            GatewayEventType::MessageUpdate => self.message_update(data).map(none),
            GatewayEventType::MessageDelete => self.message_delete(data).map(none),
            GatewayEventType::MessageDeleteBulk => self.message_delete_bulk(data).map(none),

            GatewayEventType::MessageReactionAdd => self.reaction_add(data).map(none),
            GatewayEventType::MessageReactionRemove => self.reaction_remove(data).map(none),
            GatewayEventType::MessageReactionRemoveAll => self.reaction_remove_all(data).map(none),

            GatewayEventType::ChannelPinsUpdate
            | GatewayEventType::GuildBanAdd
            | GatewayEventType::GuildBanRemove
            | GatewayEventType::PresenceUpdate
            | GatewayEventType::TypingStart
            | GatewayEventType::UserUpdate
            | GatewayEventType::VoiceStateUpdate
            | GatewayEventType::WebhooksUpdate => Ok(Vec::new()),
        }
    }

    fn ready(&self, data: &Value) -> HandlerResult<Vec<Followup>> {
        let ready: ReadyEvent = serde_json::from_value(data.clone())?;
        if let Some(user) = ready.user.as_ref() {
            let user = User::from_json(user)?;
            *self.me.lock() = Some(user.id);
            self.store.put(user.into());
        }
        Ok(vec![Followup::Ready {
            session_id: ready.session_id,
        }])
    }

    // =========================================================================
    // Helpers shared by the handlers
    // =========================================================================

    fn publish(&self, event: Event) {
        tracing::trace!(shard_id = self.shard_id, event = event.event_type(), "Publishing event");
        self.sink.publish(event);
    }

    fn guild_known(&self, guild_id: Snowflake) -> bool {
        self.store.get(&EntityKey::Guild(guild_id)).is_some()
    }

    /// Cache the user object nested in a member or message payload
    fn put_user(&self, data: &Value) -> HandlerResult<()> {
        let user = User::from_json(data)?;
        match self.store.user(user.id) {
            Some(mut cached) => {
                self.apply_refresh(EntityKey::User(user.id), &mut cached, data);
            }
            None => self.store.put(user.into()),
        }
        Ok(())
    }

    /// Diff a cached record against `data`, publishing one event per changed field
    ///
    /// Returns false when the record is not cached.
    fn refresh<T>(&self, key: EntityKey, data: &Value) -> bool
    where
        T: Refresh + Into<Entity> + TryFrom<Entity> + Clone,
    {
        let Some(mut record) = self.store.get(&key).and_then(|e| T::try_from(e).ok()) else {
            tracing::debug!(shard_id = self.shard_id, target = %key, "Update for uncached record");
            return false;
        };
        self.apply_refresh(key, &mut record, data);
        true
    }

    fn apply_refresh<T>(&self, key: EntityKey, record: &mut T, data: &Value)
    where
        T: Refresh + Into<Entity> + Clone,
    {
        let changes = record.refresh(data);
        if changes.is_empty() {
            return;
        }
        self.store.put(record.clone().into());
        for change in changes {
            self.publish(Event::FieldChanged {
                target: key,
                field: change.field,
                old: change.old,
                new: change.new,
            });
        }
    }
}

fn none(_: ()) -> Vec<Followup> {
    Vec::new()
}

/// Required snowflake field
fn id(data: &Value, field: &'static str) -> HandlerResult<Snowflake> {
    data.get(field)
        .and_then(Snowflake::from_json)
        .ok_or(DomainError::MissingField(field))
}

/// Array field, empty when absent
fn array<'a>(data: &'a Value, field: &str) -> &'a [Value] {
    data.get(field)
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice)
}
