//! Message entity - represents a chat message in a guild channel

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ReactionCount;
use crate::error::DomainError;
use crate::value_objects::{Emoji, Snowflake};

/// Message entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(default, skip_deserializing)]
    pub author_id: Snowflake,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub edited_timestamp: Option<String>,
    #[serde(default)]
    pub embeds: Vec<Value>,
    #[serde(default)]
    pub reactions: Vec<ReactionCount>,
}

impl Message {
    /// Create a new Message
    #[must_use]
    pub fn new(
        id: Snowflake,
        channel_id: Snowflake,
        author_id: Snowflake,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            channel_id,
            guild_id: None,
            author_id,
            content: content.into(),
            timestamp: None,
            edited_timestamp: None,
            embeds: Vec::new(),
            reactions: Vec::new(),
        }
    }

    /// Parse a message object payload (with nested `author`)
    pub fn from_json(data: &Value) -> Result<Self, DomainError> {
        let mut message = Self::deserialize(data)?;
        message.author_id = data
            .get("author")
            .and_then(|author| author.get("id"))
            .and_then(Snowflake::from_json)
            .ok_or(DomainError::MissingField("author.id"))?;
        Ok(message)
    }

    /// Check if message has been edited
    #[inline]
    pub fn is_edited(&self) -> bool {
        self.edited_timestamp.is_some()
    }

    /// Record one more reaction with `emoji`
    pub fn add_reaction(&mut self, emoji: &Emoji, me: bool) {
        if let Some(reaction) = self.reactions.iter_mut().find(|r| &r.emoji == emoji) {
            reaction.count += 1;
            reaction.me |= me;
        } else {
            self.reactions.push(ReactionCount::new(emoji.clone(), 1, me));
        }
    }

    /// Drop one reaction with `emoji`, removing the entry when it reaches zero
    pub fn remove_reaction(&mut self, emoji: &Emoji, me: bool) {
        if let Some(reaction) = self.reactions.iter_mut().find(|r| &r.emoji == emoji) {
            reaction.count = reaction.count.saturating_sub(1);
            if me {
                reaction.me = false;
            }
        }
        self.reactions.retain(|r| r.count > 0);
    }

    /// Remove all reactions
    pub fn clear_reactions(&mut self) {
        self.reactions.clear();
    }
}
