//! Guild entity - a community server as seen by a connected shard

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DomainError;
use crate::value_objects::{Emoji, Snowflake};

/// Guild (server) entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    pub id: Snowflake,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub owner_id: Option<Snowflake>,
    #[serde(default)]
    pub member_count: u64,
    #[serde(default)]
    pub unavailable: bool,
    #[serde(default)]
    pub emojis: Vec<Emoji>,
}

impl Guild {
    /// Create an empty Guild record
    #[must_use]
    pub fn new(id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            icon: None,
            owner_id: None,
            member_count: 0,
            unavailable: false,
            emojis: Vec::new(),
        }
    }

    /// Parse a guild object payload
    pub fn from_json(data: &Value) -> Result<Self, DomainError> {
        Ok(Self::deserialize(data)?)
    }

    /// Check if a user is the guild owner
    #[inline]
    pub fn is_owner(&self, user_id: Snowflake) -> bool {
        self.owner_id == Some(user_id)
    }

    /// Get the guild icon URL if set
    pub fn icon_url(&self) -> Option<String> {
        self.icon
            .as_ref()
            .map(|hash| format!("https://cdn.discordapp.com/icons/{}/{}.png", self.id, hash))
    }
}
