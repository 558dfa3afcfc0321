//! Channel entity - represents a text channel, voice channel, DM, or category

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Channel type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "u8", into = "u8")]
#[repr(u8)]
pub enum ChannelType {
    /// Guild text channel
    #[default]
    GuildText = 0,
    /// Direct message between two users
    Dm = 1,
    /// Guild voice channel
    GuildVoice = 2,
    /// Direct message between several users
    GroupDm = 3,
    /// Guild category for organizing channels
    GuildCategory = 4,
}

impl ChannelType {
    /// Get the numeric value
    #[inline]
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<u8> for ChannelType {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Dm,
            2 => Self::GuildVoice,
            3 => Self::GroupDm,
            4 => Self::GuildCategory,
            _ => Self::GuildText, // Default for 0 and unknown values
        }
    }
}

impl From<ChannelType> for u8 {
    fn from(ct: ChannelType) -> Self {
        ct as u8
    }
}

/// Channel entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: Snowflake,
    #[serde(rename = "type", default)]
    pub channel_type: ChannelType,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub parent_id: Option<Snowflake>,
    /// Other participant of a DM channel
    #[serde(default, skip_deserializing)]
    pub recipient_id: Option<Snowflake>,
}

impl Channel {
    /// Create a new guild text channel
    #[must_use]
    pub fn new_text(id: Snowflake, guild_id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            channel_type: ChannelType::GuildText,
            guild_id: Some(guild_id),
            name: Some(name.into()),
            topic: None,
            position: 0,
            parent_id: None,
            recipient_id: None,
        }
    }

    /// Create a new DM channel with a single recipient
    #[must_use]
    pub fn new_dm(id: Snowflake, recipient_id: Snowflake) -> Self {
        Self {
            id,
            channel_type: ChannelType::Dm,
            guild_id: None,
            name: None,
            topic: None,
            position: 0,
            parent_id: None,
            recipient_id: Some(recipient_id),
        }
    }

    /// Parse a channel object payload.
    ///
    /// `guild_id` fills in the owning guild for channels nested in a guild
    /// payload, which omit it.
    pub fn from_json(data: &Value, guild_id: Option<Snowflake>) -> Result<Self, DomainError> {
        let mut channel = Self::deserialize(data)?;
        if channel.guild_id.is_none() {
            channel.guild_id = guild_id;
        }
        channel.recipient_id = data
            .get("recipients")
            .and_then(Value::as_array)
            .and_then(|recipients| recipients.first())
            .and_then(|user| user.get("id"))
            .and_then(Snowflake::from_json);
        Ok(channel)
    }

    /// Check if this is a text channel (guild text or DM)
    #[inline]
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self.channel_type, ChannelType::GuildText | ChannelType::Dm)
    }

    /// Check if this is a DM channel
    #[inline]
    #[must_use]
    pub fn is_dm(&self) -> bool {
        matches!(self.channel_type, ChannelType::Dm)
    }

    /// Check if this is a guild channel
    #[inline]
    #[must_use]
    pub fn is_guild_channel(&self) -> bool {
        self.guild_id.is_some()
    }

    /// Get display name (channel name or fallback for DMs)
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Direct Message")
    }
}
