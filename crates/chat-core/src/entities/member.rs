//! Member entity - represents a user's membership in a guild

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Guild member entity (junction between User and Guild)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildMember {
    #[serde(default)]
    pub guild_id: Snowflake,
    #[serde(default, skip_deserializing)]
    pub user_id: Snowflake,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<Snowflake>,
    #[serde(default)]
    pub joined_at: Option<String>,
}

impl GuildMember {
    /// Create a new GuildMember
    #[must_use]
    pub fn new(guild_id: Snowflake, user_id: Snowflake) -> Self {
        Self {
            guild_id,
            user_id,
            nick: None,
            roles: Vec::new(),
            joined_at: None,
        }
    }

    /// Parse a member object payload (with nested `user`) for `guild_id`
    pub fn from_json(data: &Value, guild_id: Snowflake) -> Result<Self, DomainError> {
        let mut member = Self::deserialize(data)?;
        member.guild_id = guild_id;
        member.user_id = data
            .get("user")
            .and_then(|user| user.get("id"))
            .and_then(Snowflake::from_json)
            .ok_or(DomainError::MissingField("user.id"))?;
        Ok(member)
    }

    /// Get display name (nickname if set, otherwise fallback)
    pub fn display_name<'a>(&'a self, username: &'a str) -> &'a str {
        self.nick.as_deref().unwrap_or(username)
    }

    /// Check if member has a specific role
    #[inline]
    pub fn has_role(&self, role_id: Snowflake) -> bool {
        self.roles.contains(&role_id)
    }
}
