//! Payload definitions
//!
//! `d` payloads for Hello (inbound) and the client-sent op codes.

use chat_core::Snowflake;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Payload for op 10 (Hello)
///
/// Sent by the server immediately after connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

impl HelloPayload {
    #[must_use]
    pub fn with_interval(heartbeat_interval: u64) -> Self {
        Self { heartbeat_interval }
    }
}

/// Payload for op 2 (Identify)
///
/// Starts a fresh session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Bot token
    pub token: String,

    /// Client connection properties
    pub properties: IdentifyProperties,

    /// Request zlib-compressed dispatches
    pub compress: bool,

    /// `[shard_id, shard_count]`, only sent when sharding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shard: Option<[u32; 2]>,

    /// Gateway intent bits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intents: Option<u64>,
}

impl IdentifyPayload {
    #[must_use]
    pub fn new(token: impl Into<String>, shard_id: u32, shard_count: u32) -> Self {
        Self {
            token: token.into(),
            properties: IdentifyProperties::default(),
            compress: true,
            shard: (shard_count > 1).then_some([shard_id, shard_count]),
            intents: None,
        }
    }

    #[must_use]
    pub fn with_intents(mut self, intents: Option<u64>) -> Self {
        self.intents = intents;
        self
    }
}

/// Client connection properties
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyProperties {
    /// Operating system
    #[serde(rename = "$os")]
    pub os: String,

    /// Library name
    #[serde(rename = "$browser")]
    pub browser: String,

    /// Device name
    #[serde(rename = "$device")]
    pub device: String,
}

impl Default for IdentifyProperties {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            browser: LIBRARY_NAME.to_string(),
            device: LIBRARY_NAME.to_string(),
        }
    }
}

const LIBRARY_NAME: &str = "chat-client";

/// Payload for op 6 (Resume)
///
/// Replays the events missed since `seq` on an existing session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumePayload {
    /// Bot token
    pub token: String,

    /// Session ID to resume
    pub session_id: String,

    /// Last received sequence number
    pub seq: i64,
}

/// Online status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Online,
    Idle,
    #[serde(rename = "dnd")]
    DoNotDisturb,
    Invisible,
    Offline,
}

/// Activity kind shown next to the status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ActivityType {
    Playing = 0,
    Streaming = 1,
    Listening = 2,
    Watching = 3,
}

impl ActivityType {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Playing),
            1 => Some(Self::Streaming),
            2 => Some(Self::Listening),
            3 => Some(Self::Watching),
            _ => None,
        }
    }
}

impl Serialize for ActivityType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for ActivityType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Self::from_u8(value).ok_or_else(|| serde::de::Error::custom(format!("invalid activity type: {value}")))
    }
}

/// Activity shown next to the status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub name: String,
}

/// Payload for op 3 (Presence Update)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceUpdatePayload {
    pub afk: bool,
    pub since: Option<u64>,
    pub status: Status,
    /// `null` clears the activity
    pub game: Option<Activity>,
}

impl PresenceUpdatePayload {
    /// Build a presence update; the activity is only set when both halves are given
    #[must_use]
    pub fn new(status: Status, activity_type: Option<ActivityType>, activity_name: Option<String>) -> Self {
        let game = match (activity_type, activity_name) {
            (Some(kind), Some(name)) => Some(Activity { kind, name }),
            _ => None,
        };
        Self {
            afk: false,
            since: None,
            status,
            game,
        }
    }
}

/// Payload for op 8 (Request Guild Members)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestGuildMembersPayload {
    pub guild_id: Snowflake,
    /// Username prefix; empty matches everyone
    pub query: String,
    /// 0 means no limit
    pub limit: u32,
}

impl RequestGuildMembersPayload {
    /// Request every member of a guild
    #[must_use]
    pub fn all(guild_id: Snowflake) -> Self {
        Self {
            guild_id,
            query: String::new(),
            limit: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_identify_unsharded() {
        let payload = IdentifyPayload::new("token", 0, 1);
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["token"], "token");
        assert_eq!(value["compress"], true);
        assert_eq!(value["properties"]["$browser"], "chat-client");
        assert!(value.get("shard").is_none());
        assert!(value.get("intents").is_none());
    }

    #[test]
    fn test_identify_sharded_with_intents() {
        let payload = IdentifyPayload::new("token", 1, 4).with_intents(Some(513));
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["shard"], json!([1, 4]));
        assert_eq!(value["intents"], 513);
    }

    #[test]
    fn test_resume_payload_shape() {
        let payload = ResumePayload {
            token: "token".to_string(),
            session_id: "abc".to_string(),
            seq: 42,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value, json!({"token": "token", "session_id": "abc", "seq": 42}));
    }

    #[test]
    fn test_presence_without_activity() {
        let payload = PresenceUpdatePayload::new(Status::Idle, None, None);
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({"afk": false, "since": null, "status": "idle", "game": null})
        );

        let decoded: PresenceUpdatePayload = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_presence_with_activity() {
        let payload = PresenceUpdatePayload::new(
            Status::DoNotDisturb,
            Some(ActivityType::Listening),
            Some("music".to_string()),
        );
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["status"], "dnd");
        assert_eq!(value["game"], json!({"type": 2, "name": "music"}));

        let decoded: PresenceUpdatePayload = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_presence_half_activity_is_cleared() {
        let payload = PresenceUpdatePayload::new(Status::Online, Some(ActivityType::Playing), None);
        assert_eq!(payload.game, None);
    }

    #[test]
    fn test_request_guild_members() {
        let value = serde_json::to_value(RequestGuildMembersPayload::all(Snowflake::new(9))).unwrap();
        assert_eq!(value, json!({"guild_id": "9", "query": "", "limit": 0}));
    }

    #[test]
    fn test_hello_payload() {
        let hello: HelloPayload = serde_json::from_value(json!({"heartbeat_interval": 41250})).unwrap();
        assert_eq!(hello.heartbeat_interval, 41250);
        assert!(serde_json::from_value::<HelloPayload>(Value::Null).is_err());
    }
}
