//! Entity store port - keyed containers for every cached record kind
//!
//! The gateway resolves and mutates records only through this trait; the
//! concrete container lives in the infrastructure layer.

use serde_json::Value;

use crate::entities::{Channel, Entity, EntityKey, EntityKind, Guild, GuildMember, Message, Role, User};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for store operations
pub type StoreResult<T> = Result<T, DomainError>;

// ============================================================================
// Entity Store
// ============================================================================

pub trait EntityStore: Send + Sync {
    /// Find a record by key
    fn get(&self, key: &EntityKey) -> Option<Entity>;

    /// Insert or replace a record under its own key
    fn put(&self, entity: Entity);

    /// Remove a record, returning it if it was cached
    fn remove(&self, key: &EntityKey) -> Option<Entity>;

    /// Snapshot every record of one kind
    fn list(&self, kind: EntityKind) -> Vec<Entity>;

    /// Return the cached record for `key`, or build it from `data` and cache it
    fn resolve_or_create(&self, key: EntityKey, data: &Value) -> StoreResult<Entity> {
        if let Some(existing) = self.get(&key) {
            return Ok(existing);
        }
        let entity = Entity::from_json(key, data)?;
        self.put(entity.clone());
        Ok(entity)
    }
}

// ============================================================================
// Typed Accessors
// ============================================================================

/// Typed lookups over any [`EntityStore`]
pub trait StoreExt: EntityStore {
    fn guild(&self, id: Snowflake) -> Option<Guild> {
        self.get(&EntityKey::Guild(id)).and_then(|e| e.try_into().ok())
    }

    fn channel(&self, id: Snowflake) -> Option<Channel> {
        self.get(&EntityKey::Channel(id)).and_then(|e| e.try_into().ok())
    }

    fn user(&self, id: Snowflake) -> Option<User> {
        self.get(&EntityKey::User(id)).and_then(|e| e.try_into().ok())
    }

    fn role(&self, id: Snowflake) -> Option<Role> {
        self.get(&EntityKey::Role(id)).and_then(|e| e.try_into().ok())
    }

    fn member(&self, guild_id: Snowflake, user_id: Snowflake) -> Option<GuildMember> {
        self.get(&EntityKey::Member { guild_id, user_id })
            .and_then(|e| e.try_into().ok())
    }

    fn message(&self, id: Snowflake) -> Option<Message> {
        self.get(&EntityKey::Message(id)).and_then(|e| e.try_into().ok())
    }

    /// Every cached guild
    fn guilds(&self) -> Vec<Guild> {
        self.list(EntityKind::Guild)
            .into_iter()
            .filter_map(|e| e.try_into().ok())
            .collect()
    }

    /// Records owned by `owner` (channels, roles and members of a guild,
    /// messages of a channel)
    fn children(&self, kind: EntityKind, owner: EntityKey) -> Vec<Entity> {
        self.list(kind)
            .into_iter()
            .filter(|e| e.owner() == Some(owner))
            .collect()
    }

    /// Remove a guild together with its channels, roles and members
    fn remove_guild(&self, id: Snowflake) -> Option<Guild> {
        let owner = EntityKey::Guild(id);
        for kind in [EntityKind::Channel, EntityKind::Role, EntityKind::Member] {
            for child in self.children(kind, owner) {
                self.remove(&child.key());
            }
        }
        self.remove(&owner).and_then(|e| e.try_into().ok())
    }
}

impl<T: EntityStore + ?Sized> StoreExt for T {}
