//! Field-by-field refresh of cached records from update payloads
//!
//! Each record kind carries a static table of [`FieldDescriptor`]s. An update
//! dispatch walks the table, compares the cached value against the payload and
//! writes back every field that differs, reporting one [`FieldChange`] per
//! changed field.

use serde_json::Value;

use crate::entities::{Channel, Guild, GuildMember, Message, Role, User};
use crate::value_objects::Snowflake;

/// One mutable field of a record kind
pub struct FieldDescriptor<T> {
    /// Field name as reported in change events
    pub name: &'static str,
    /// Read the field from a payload; `None` leaves the field untouched
    pub extract: fn(&Value) -> Option<Value>,
    /// Read the cached value
    pub get: fn(&T) -> Value,
    /// Write a new value
    pub set: fn(&mut T, &Value),
}

/// A single field that changed during a refresh
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub field: &'static str,
    pub old: Value,
    pub new: Value,
}

/// Record kinds that can be refreshed from a payload
pub trait Refresh: Sized + 'static {
    /// Mutable fields of this kind
    fn fields() -> &'static [FieldDescriptor<Self>];

    /// Apply `data` to `self`, returning the fields that changed
    fn refresh(&mut self, data: &Value) -> Vec<FieldChange> {
        refresh(self, Self::fields(), data)
    }
}

/// Apply `data` to `target` through `fields`
pub fn refresh<T>(target: &mut T, fields: &[FieldDescriptor<T>], data: &Value) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    for field in fields {
        let Some(new) = (field.extract)(data) else {
            continue;
        };
        let old = (field.get)(target);
        if old != new {
            (field.set)(target, &new);
            changes.push(FieldChange {
                field: field.name,
                old,
                new,
            });
        }
    }
    changes
}

// ============================================================================
// Value helpers
// ============================================================================

fn present(data: &Value, key: &str) -> Option<Value> {
    data.get(key).cloned()
}

/// Absent keys read as null
fn nullable(data: &Value, key: &str) -> Option<Value> {
    Some(data.get(key).cloned().unwrap_or(Value::Null))
}

fn string(value: &Value) -> String {
    value.as_str().unwrap_or_default().to_owned()
}

fn opt_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}

fn boolean(value: &Value) -> bool {
    value.as_bool().unwrap_or_default()
}

fn snowflakes(value: &Value) -> Vec<Snowflake> {
    value
        .as_array()
        .map(|ids| ids.iter().filter_map(Snowflake::from_json).collect())
        .unwrap_or_default()
}

// ============================================================================
// Tables
// ============================================================================

static GUILD_FIELDS: &[FieldDescriptor<Guild>] = &[
    FieldDescriptor {
        name: "name",
        extract: |d| present(d, "name"),
        get: |g| Value::from(g.name.as_str()),
        set: |g, v| g.name = string(v),
    },
    FieldDescriptor {
        name: "icon",
        extract: |d| nullable(d, "icon"),
        get: |g| g.icon.clone().map_or(Value::Null, Value::from),
        set: |g, v| g.icon = opt_string(v),
    },
];

static CHANNEL_FIELDS: &[FieldDescriptor<Channel>] = &[
    FieldDescriptor {
        name: "name",
        extract: |d| nullable(d, "name"),
        get: |c| c.name.clone().map_or(Value::Null, Value::from),
        set: |c, v| c.name = opt_string(v),
    },
    FieldDescriptor {
        name: "topic",
        extract: |d| nullable(d, "topic"),
        get: |c| c.topic.clone().map_or(Value::Null, Value::from),
        set: |c, v| c.topic = opt_string(v),
    },
    FieldDescriptor {
        name: "position",
        extract: |d| present(d, "position"),
        get: |c| Value::from(c.position),
        set: |c, v| c.position = v.as_i64().unwrap_or_default(),
    },
];

static ROLE_FIELDS: &[FieldDescriptor<Role>] = &[
    FieldDescriptor {
        name: "name",
        extract: |d| present(d, "name"),
        get: |r| Value::from(r.name.as_str()),
        set: |r, v| r.name = string(v),
    },
    FieldDescriptor {
        name: "color",
        extract: |d| present(d, "color"),
        get: |r| Value::from(r.color),
        set: |r, v| r.color = v.as_u64().and_then(|c| u32::try_from(c).ok()).unwrap_or_default(),
    },
    FieldDescriptor {
        name: "hoist",
        extract: |d| present(d, "hoist"),
        get: |r| Value::from(r.hoist),
        set: |r, v| r.hoist = boolean(v),
    },
    FieldDescriptor {
        name: "managed",
        extract: |d| present(d, "managed"),
        get: |r| Value::from(r.managed),
        set: |r, v| r.managed = boolean(v),
    },
    FieldDescriptor {
        name: "mentionable",
        extract: |d| present(d, "mentionable"),
        get: |r| Value::from(r.mentionable),
        set: |r, v| r.mentionable = boolean(v),
    },
];

static MEMBER_FIELDS: &[FieldDescriptor<GuildMember>] = &[
    FieldDescriptor {
        name: "nick",
        extract: |d| nullable(d, "nick"),
        get: |m| m.nick.clone().map_or(Value::Null, Value::from),
        set: |m, v| m.nick = opt_string(v),
    },
    FieldDescriptor {
        name: "roles",
        extract: |d| present(d, "roles"),
        get: |m| Value::from(m.roles.iter().map(ToString::to_string).collect::<Vec<_>>()),
        set: |m, v| m.roles = snowflakes(v),
    },
];

static MESSAGE_FIELDS: &[FieldDescriptor<Message>] = &[
    // Embed-only updates omit content
    FieldDescriptor {
        name: "content",
        extract: |d| present(d, "content"),
        get: |m| Value::from(m.content.as_str()),
        set: |m, v| m.content = string(v),
    },
    FieldDescriptor {
        name: "embeds",
        extract: |d| present(d, "embeds"),
        get: |m| Value::from(m.embeds.clone()),
        set: |m, v| m.embeds = v.as_array().cloned().unwrap_or_default(),
    },
];

static USER_FIELDS: &[FieldDescriptor<User>] = &[
    FieldDescriptor {
        name: "username",
        extract: |d| present(d, "username"),
        get: |u| Value::from(u.username.as_str()),
        set: |u, v| u.username = string(v),
    },
    FieldDescriptor {
        name: "discriminator",
        extract: |d| present(d, "discriminator"),
        get: |u| Value::from(u.discriminator.as_str()),
        set: |u, v| u.discriminator = string(v),
    },
    FieldDescriptor {
        name: "avatar",
        extract: |d| nullable(d, "avatar"),
        get: |u| u.avatar.clone().map_or(Value::Null, Value::from),
        set: |u, v| u.avatar = opt_string(v),
    },
];

impl Refresh for Guild {
    fn fields() -> &'static [FieldDescriptor<Self>] {
        GUILD_FIELDS
    }
}

impl Refresh for Channel {
    fn fields() -> &'static [FieldDescriptor<Self>] {
        CHANNEL_FIELDS
    }
}

impl Refresh for Role {
    fn fields() -> &'static [FieldDescriptor<Self>] {
        ROLE_FIELDS
    }
}

impl Refresh for GuildMember {
    fn fields() -> &'static [FieldDescriptor<Self>] {
        MEMBER_FIELDS
    }
}

impl Refresh for Message {
    fn fields() -> &'static [FieldDescriptor<Self>] {
        MESSAGE_FIELDS
    }
}

impl Refresh for User {
    fn fields() -> &'static [FieldDescriptor<Self>] {
        USER_FIELDS
    }
}
