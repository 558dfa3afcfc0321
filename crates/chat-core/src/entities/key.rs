//! Entity keys and the tagged entity record held by an `EntityStore`
//!
//! Child records point at their owner by id only (message to channel, channel
//! to guild, role and member to guild); owners never hold child records.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use super::{Channel, Guild, GuildMember, Message, Role, User};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Kind of cached record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Guild,
    Channel,
    User,
    Role,
    Member,
    Message,
}

impl EntityKind {
    /// Get kind name for logging
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Guild => "guild",
            Self::Channel => "channel",
            Self::User => "user",
            Self::Role => "role",
            Self::Member => "member",
            Self::Message => "message",
        }
    }
}

/// Identity of a cached record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityKey {
    Guild(Snowflake),
    Channel(Snowflake),
    User(Snowflake),
    Role(Snowflake),
    Member { guild_id: Snowflake, user_id: Snowflake },
    Message(Snowflake),
}

impl EntityKey {
    /// Kind of record this key addresses
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Guild(_) => EntityKind::Guild,
            Self::Channel(_) => EntityKind::Channel,
            Self::User(_) => EntityKind::User,
            Self::Role(_) => EntityKind::Role,
            Self::Member { .. } => EntityKind::Member,
            Self::Message(_) => EntityKind::Message,
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Member { guild_id, user_id } => write!(f, "member {guild_id}/{user_id}"),
            Self::Guild(id)
            | Self::Channel(id)
            | Self::User(id)
            | Self::Role(id)
            | Self::Message(id) => write!(f, "{} {id}", self.kind().as_str()),
        }
    }
}

/// A cached record of any kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Entity {
    Guild(Guild),
    Channel(Channel),
    User(User),
    Role(Role),
    Member(GuildMember),
    Message(Message),
}

impl Entity {
    /// Build a record of the kind `key` addresses from its JSON payload.
    ///
    /// Roles read their owning guild from a `guild_id` field on the payload.
    pub fn from_json(key: EntityKey, data: &Value) -> Result<Self, DomainError> {
        let entity = match key {
            EntityKey::Guild(_) => Self::Guild(Guild::from_json(data)?),
            EntityKey::Channel(_) => Self::Channel(Channel::from_json(data, None)?),
            EntityKey::User(_) => Self::User(User::from_json(data)?),
            EntityKey::Role(_) => {
                let guild_id = data
                    .get("guild_id")
                    .and_then(Snowflake::from_json)
                    .unwrap_or_default();
                Self::Role(Role::from_json(data, guild_id)?)
            }
            EntityKey::Member { guild_id, .. } => {
                Self::Member(GuildMember::from_json(data, guild_id)?)
            }
            EntityKey::Message(_) => Self::Message(Message::from_json(data)?),
        };
        if entity.key() != key {
            return Err(DomainError::InvalidField {
                field: "id",
                reason: format!("payload id does not match {key}"),
            });
        }
        Ok(entity)
    }

    /// Identity of this record
    #[must_use]
    pub fn key(&self) -> EntityKey {
        match self {
            Self::Guild(g) => EntityKey::Guild(g.id),
            Self::Channel(c) => EntityKey::Channel(c.id),
            Self::User(u) => EntityKey::User(u.id),
            Self::Role(r) => EntityKey::Role(r.id),
            Self::Member(m) => EntityKey::Member {
                guild_id: m.guild_id,
                user_id: m.user_id,
            },
            Self::Message(m) => EntityKey::Message(m.id),
        }
    }

    /// Owning record, if this record belongs to one
    #[must_use]
    pub fn owner(&self) -> Option<EntityKey> {
        match self {
            Self::Guild(_) | Self::User(_) => None,
            Self::Channel(c) => c.guild_id.map(EntityKey::Guild),
            Self::Role(r) => Some(EntityKey::Guild(r.guild_id)),
            Self::Member(m) => Some(EntityKey::Guild(m.guild_id)),
            Self::Message(m) => Some(EntityKey::Channel(m.channel_id)),
        }
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.key().kind()
    }
}

macro_rules! entity_conversions {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Entity {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }

            impl TryFrom<Entity> for $ty {
                type Error = DomainError;

                fn try_from(entity: Entity) -> Result<Self, Self::Error> {
                    match entity {
                        Entity::$variant(value) => Ok(value),
                        other => Err(DomainError::KindMismatch(other.key())),
                    }
                }
            }
        )*
    };
}

entity_conversions! {
    Guild => Guild,
    Channel => Channel,
    User => User,
    Role => Role,
    Member => GuildMember,
    Message => Message,
}
