//! Emoji - reaction emoji, either a unicode glyph or a guild custom emoji

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Snowflake;

/// Reaction emoji
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawEmoji", into = "RawEmoji")]
pub enum Emoji {
    /// Plain unicode emoji, identified by its glyph
    Unicode(String),
    /// Guild custom emoji, identified by id
    Custom { id: Snowflake, name: String },
}

impl Emoji {
    /// Create a unicode emoji
    #[must_use]
    pub fn unicode(glyph: impl Into<String>) -> Self {
        Self::Unicode(glyph.into())
    }

    /// Create a custom emoji
    #[must_use]
    pub fn custom(id: Snowflake, name: impl Into<String>) -> Self {
        Self::Custom {
            id,
            name: name.into(),
        }
    }

    /// Display name of the emoji
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Unicode(glyph) => glyph,
            Self::Custom { name, .. } => name,
        }
    }

    /// Custom emoji id, if any
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<Snowflake> {
        match self {
            Self::Unicode(_) => None,
            Self::Custom { id, .. } => Some(*id),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom { .. })
    }

    /// Form used in REST paths: the glyph, or `name:id` for custom emoji
    #[must_use]
    pub fn api_name(&self) -> String {
        match self {
            Self::Unicode(glyph) => glyph.clone(),
            Self::Custom { id, name } => format!("{name}:{id}"),
        }
    }
}

impl fmt::Display for Emoji {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unicode(glyph) => f.write_str(glyph),
            Self::Custom { id, name } => write!(f, "<:{name}:{id}>"),
        }
    }
}

/// Wire shape: `{"id": "123" | null, "name": "..."}`
#[derive(Debug, Serialize, Deserialize)]
struct RawEmoji {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    name: Option<String>,
}

impl From<RawEmoji> for Emoji {
    fn from(raw: RawEmoji) -> Self {
        let name = raw.name.unwrap_or_default();
        match raw.id.as_ref().and_then(Snowflake::from_json) {
            Some(id) => Self::Custom { id, name },
            None => Self::Unicode(name),
        }
    }
}

impl From<Emoji> for RawEmoji {
    fn from(emoji: Emoji) -> Self {
        match emoji {
            Emoji::Unicode(glyph) => Self {
                id: None,
                name: Some(glyph),
            },
            Emoji::Custom { id, name } => Self {
                id: Some(serde_json::Value::String(id.to_string())),
                name: Some(name),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unicode_emoji_from_payload() {
        let emoji: Emoji = serde_json::from_value(json!({"id": null, "name": "👍"})).unwrap();
        assert_eq!(emoji, Emoji::unicode("👍"));
        assert!(!emoji.is_custom());
        assert_eq!(emoji.api_name(), "👍");
    }

    #[test]
    fn test_custom_emoji_from_payload() {
        let emoji: Emoji =
            serde_json::from_value(json!({"id": "41771983429993937", "name": "LUL"})).unwrap();
        assert_eq!(emoji.id(), Some(Snowflake::new(41_771_983_429_993_937)));
        assert_eq!(emoji.name(), "LUL");
        assert_eq!(emoji.api_name(), "LUL:41771983429993937");
    }

    #[test]
    fn test_non_numeric_id_is_unicode() {
        let emoji: Emoji = serde_json::from_value(json!({"id": "abc", "name": "x"})).unwrap();
        assert_eq!(emoji, Emoji::unicode("x"));
    }

    #[test]
    fn test_custom_emoji_wire_shape() {
        let value = serde_json::to_value(Emoji::custom(Snowflake::new(7), "wave")).unwrap();
        assert_eq!(value, json!({"id": "7", "name": "wave"}));
    }

    #[test]
    fn test_display() {
        assert_eq!(Emoji::custom(Snowflake::new(7), "wave").to_string(), "<:wave:7>");
        assert_eq!(Emoji::unicode("🔥").to_string(), "🔥");
    }
}
