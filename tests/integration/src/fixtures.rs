//! Gateway payload fixtures

use serde_json::{json, Value};

pub const BOT_ID: &str = "5";
pub const GUILD_ID: u64 = 100;
pub const CHANNEL_ID: u64 = 110;

pub fn hello(heartbeat_interval: u64) -> Value {
    json!({"op": 10, "d": {"heartbeat_interval": heartbeat_interval}})
}

pub fn heartbeat_ack() -> Value {
    json!({"op": 11})
}

pub fn dispatch(event: &str, sequence: i64, data: Value) -> Value {
    json!({"op": 0, "s": sequence, "t": event, "d": data})
}

pub fn ready(session_id: &str) -> Value {
    json!({
        "v": 6,
        "session_id": session_id,
        "user": {"id": BOT_ID, "username": "bot", "discriminator": "0000"},
        "guilds": [{"id": GUILD_ID.to_string(), "unavailable": true}]
    })
}

pub fn guild() -> Value {
    json!({
        "id": GUILD_ID.to_string(),
        "name": "Integration Guild",
        "member_count": 2,
        "channels": [
            {"id": CHANNEL_ID.to_string(), "type": 0, "name": "general", "position": 0},
            {"id": "111", "type": 2, "name": "voice", "position": 1}
        ],
        "roles": [{"id": "120", "name": "@everyone", "color": 0}],
        "members": [
            {"user": {"id": BOT_ID, "username": "bot", "discriminator": "0000"}, "roles": []},
            {"user": {"id": "130", "username": "grace", "discriminator": "1906"}, "roles": ["120"]}
        ]
    })
}

pub fn message(id: &str, author_id: &str, content: &str) -> Value {
    json!({
        "id": id,
        "channel_id": CHANNEL_ID.to_string(),
        "guild_id": GUILD_ID.to_string(),
        "author": {"id": author_id, "username": "grace", "discriminator": "1906"},
        "content": content,
        "embeds": []
    })
}

pub fn reaction(user_id: &str, message_id: &str, emoji: Value) -> Value {
    json!({
        "user_id": user_id,
        "channel_id": CHANNEL_ID.to_string(),
        "message_id": message_id,
        "guild_id": GUILD_ID.to_string(),
        "emoji": emoji
    })
}
