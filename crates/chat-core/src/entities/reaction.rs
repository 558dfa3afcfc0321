//! Reaction counts attached to a cached message

use serde::{Deserialize, Serialize};

use crate::value_objects::Emoji;

/// Aggregated reaction count for one emoji on a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionCount {
    pub emoji: Emoji,
    #[serde(default)]
    pub count: u32,
    /// Whether the current user reacted with this emoji
    #[serde(default)]
    pub me: bool,
}

impl ReactionCount {
    /// Create a new ReactionCount
    #[must_use]
    pub fn new(emoji: Emoji, count: u32, me: bool) -> Self {
        Self { emoji, count, me }
    }
}
