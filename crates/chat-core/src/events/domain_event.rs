//! Domain events - decoded from gateway dispatches and handed to the event sink
//!
//! The set of events is closed; consumers match on [`Event`] directly.

use serde::Serialize;
use serde_json::Value;

use crate::entities::{Channel, EntityKey, Guild, GuildMember, Message, Role};
use crate::value_objects::{Emoji, Snowflake};

/// All events a shard can publish
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    // =========================================================================
    // Shard Lifecycle
    // =========================================================================
    ShardConnected { shard_id: u32 },
    ShardResumed { shard_id: u32 },
    ShardDisconnected { shard_id: u32, close_code: Option<u16> },

    // =========================================================================
    // Guild Events
    // =========================================================================
    GuildCreate { guild: Guild },
    GuildDelete { guild_id: Snowflake },

    // =========================================================================
    // Channel Events
    // =========================================================================
    ChannelCreate { channel: Channel },
    ChannelDelete { channel_id: Snowflake, guild_id: Option<Snowflake> },

    // =========================================================================
    // Member Events
    // =========================================================================
    MemberAdd { member: GuildMember },
    MemberRemove { guild_id: Snowflake, user_id: Snowflake },

    // =========================================================================
    // Role Events
    // =========================================================================
    RoleCreate { role: Role },
    RoleDelete { guild_id: Snowflake, role_id: Snowflake },

    // =========================================================================
    // Message Events
    // =========================================================================
    MessageCreate { message: Message },
    MessageDelete { channel_id: Snowflake, message_id: Snowflake },

    // =========================================================================
    // Reaction Events
    // =========================================================================
    ReactionAdd {
        channel_id: Snowflake,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: Emoji,
    },
    ReactionRemove {
        channel_id: Snowflake,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: Emoji,
    },
    ReactionClear { channel_id: Snowflake, message_id: Snowflake },

    // =========================================================================
    // Field Diffs
    // =========================================================================
    /// One mutable field of a cached record changed on an update dispatch
    FieldChanged {
        target: EntityKey,
        field: &'static str,
        old: Value,
        new: Value,
    },
}

impl Event {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ShardConnected { .. } => "SHARD_CONNECTED",
            Self::ShardResumed { .. } => "SHARD_RESUMED",
            Self::ShardDisconnected { .. } => "SHARD_DISCONNECTED",
            Self::GuildCreate { .. } => "GUILD_CREATE",
            Self::GuildDelete { .. } => "GUILD_DELETE",
            Self::ChannelCreate { .. } => "CHANNEL_CREATE",
            Self::ChannelDelete { .. } => "CHANNEL_DELETE",
            Self::MemberAdd { .. } => "MEMBER_ADD",
            Self::MemberRemove { .. } => "MEMBER_REMOVE",
            Self::RoleCreate { .. } => "ROLE_CREATE",
            Self::RoleDelete { .. } => "ROLE_DELETE",
            Self::MessageCreate { .. } => "MESSAGE_CREATE",
            Self::MessageDelete { .. } => "MESSAGE_DELETE",
            Self::ReactionAdd { .. } => "REACTION_ADD",
            Self::ReactionRemove { .. } => "REACTION_REMOVE",
            Self::ReactionClear { .. } => "REACTION_CLEAR",
            Self::FieldChanged { .. } => "FIELD_CHANGED",
        }
    }

    /// Guild the event belongs to, when it is known without a store lookup
    pub fn guild_id(&self) -> Option<Snowflake> {
        match self {
            Self::GuildCreate { guild } => Some(guild.id),
            Self::GuildDelete { guild_id }
            | Self::MemberRemove { guild_id, .. }
            | Self::RoleDelete { guild_id, .. } => Some(*guild_id),
            Self::ChannelCreate { channel } => channel.guild_id,
            Self::ChannelDelete { guild_id, .. } => *guild_id,
            Self::MemberAdd { member } => Some(member.guild_id),
            Self::RoleCreate { role } => Some(role.guild_id),
            Self::MessageCreate { message } => message.guild_id,
            _ => None,
        }
    }
}
