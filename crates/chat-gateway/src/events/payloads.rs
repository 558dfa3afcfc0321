//! Event payload definitions
//!
//! Typed shapes of the dispatch payloads that only carry ids. Payloads that
//! describe a whole record are decoded by the record itself.

use chat_core::{Emoji, Snowflake};
use serde::Deserialize;
use serde_json::Value;

/// READY event payload
#[derive(Debug, Clone, Deserialize)]
pub struct ReadyEvent {
    /// Session ID for resuming
    pub session_id: String,

    /// Current user
    #[serde(default)]
    pub user: Option<Value>,
}

/// User reference inside member payloads
#[derive(Debug, Clone, Deserialize)]
pub struct UserIdPayload {
    pub id: Snowflake,
}

/// GUILD_DELETE event payload
#[derive(Debug, Clone, Deserialize)]
pub struct GuildDeleteEvent {
    pub id: Snowflake,
    /// Set when the guild suffered an outage rather than being left
    #[serde(default)]
    pub unavailable: bool,
}

/// GUILD_EMOJIS_UPDATE event payload
#[derive(Debug, Clone, Deserialize)]
pub struct GuildEmojisUpdateEvent {
    pub guild_id: Snowflake,
    pub emojis: Vec<Emoji>,
}

/// GUILD_MEMBER_REMOVE event payload
#[derive(Debug, Clone, Deserialize)]
pub struct GuildMemberRemoveEvent {
    pub guild_id: Snowflake,
    pub user: UserIdPayload,
}

/// GUILD_MEMBERS_CHUNK event payload
#[derive(Debug, Clone, Deserialize)]
pub struct GuildMembersChunkEvent {
    pub guild_id: Snowflake,
    pub members: Vec<Value>,
}

/// GUILD_ROLE_CREATE / GUILD_ROLE_UPDATE event payload
#[derive(Debug, Clone, Deserialize)]
pub struct GuildRoleEvent {
    pub guild_id: Snowflake,
    pub role: Value,
}

/// GUILD_ROLE_DELETE event payload
#[derive(Debug, Clone, Deserialize)]
pub struct GuildRoleDeleteEvent {
    pub guild_id: Snowflake,
    pub role_id: Snowflake,
}

/// MESSAGE_DELETE event payload
#[derive(Debug, Clone, Deserialize)]
pub struct MessageDeleteEvent {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
}

/// MESSAGE_DELETE_BULK event payload
#[derive(Debug, Clone, Deserialize)]
pub struct MessageDeleteBulkEvent {
    pub ids: Vec<Snowflake>,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
}

/// MESSAGE_REACTION_ADD / MESSAGE_REACTION_REMOVE event payload
#[derive(Debug, Clone, Deserialize)]
pub struct MessageReactionEvent {
    pub user_id: Snowflake,
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    pub emoji: Emoji,
}

/// MESSAGE_REACTION_REMOVE_ALL event payload
#[derive(Debug, Clone, Deserialize)]
pub struct MessageReactionRemoveAllEvent {
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reaction_event() {
        let event: MessageReactionEvent = serde_json::from_value(json!({
            "user_id": "1",
            "channel_id": "2",
            "message_id": "3",
            "guild_id": "4",
            "emoji": {"id": null, "name": "🔥"}
        }))
        .unwrap();

        assert_eq!(event.guild_id, Some(Snowflake::new(4)));
        assert_eq!(event.emoji, Emoji::unicode("🔥"));
    }

    #[test]
    fn test_message_delete_without_guild() {
        let event: MessageDeleteEvent =
            serde_json::from_value(json!({"id": "1", "channel_id": "2"})).unwrap();
        assert_eq!(event.guild_id, None);
    }

    #[test]
    fn test_guild_delete_unavailable_defaults_false() {
        let event: GuildDeleteEvent = serde_json::from_value(json!({"id": "1"})).unwrap();
        assert!(!event.unavailable);
    }

    #[test]
    fn test_ready_requires_session_id() {
        assert!(serde_json::from_value::<ReadyEvent>(json!({"user": {}})).is_err());
    }
}
