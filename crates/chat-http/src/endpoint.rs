//! Endpoint templates and rate-limit route identity
//!
//! A template is a path with `{name}` placeholders plus the subset of names
//! that are "major parameters". Compiling a template fills every placeholder
//! for the request path, but only the major ones for the route identity, so
//! requests that differ only in minor parameters share one bucket.

use std::fmt;

use chat_core::{Emoji, Snowflake};

/// HTTP method of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path template with its major parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointTemplate {
    pub method: Method,
    pub path: &'static str,
    pub majors: &'static [&'static str],
}

impl EndpointTemplate {
    #[must_use]
    pub const fn new(method: Method, path: &'static str, majors: &'static [&'static str]) -> Self {
        Self {
            method,
            path,
            majors,
        }
    }

    /// Fill placeholders in order with `args`.
    ///
    /// Non-major placeholders stay literal in the identity.
    #[must_use]
    pub fn compile(&self, args: &[&str]) -> Route {
        let mut path = String::with_capacity(self.path.len() + 32);
        let mut identity = String::with_capacity(self.path.len() + 16);
        let mut rest = self.path;
        let mut index = 0;

        while let Some(open) = rest.find('{') {
            let Some(len) = rest[open..].find('}') else {
                break;
            };
            let placeholder = &rest[open..=open + len];
            let name = &placeholder[1..placeholder.len() - 1];
            let literal = &rest[..open];
            debug_assert!(index < args.len(), "missing argument for {{{name}}}");
            let value = args.get(index).copied().unwrap_or_default();

            path.push_str(literal);
            path.push_str(value);
            identity.push_str(literal);
            if self.majors.contains(&name) {
                identity.push_str(value);
            } else {
                identity.push_str(placeholder);
            }

            rest = &rest[open + len + 1..];
            index += 1;
        }
        path.push_str(rest);
        identity.push_str(rest);

        Route {
            method: self.method,
            identity,
            path,
        }
    }
}

/// A compiled endpoint ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub method: Method,
    /// Bucket key; the method is deliberately not part of it
    pub identity: String,
    /// Request path relative to the API base URL
    pub path: String,
}

/// Emoji as a path segment: `name` or `name:id`, percent-encoded
pub fn emoji_segment(emoji: &Emoji) -> String {
    urlencoding::encode(&emoji.api_name()).into_owned()
}

// ============================================================================
// Endpoints
// ============================================================================

pub const GATEWAY: EndpointTemplate = EndpointTemplate::new(Method::Get, "/gateway", &[]);

pub const SEND_MESSAGE: EndpointTemplate =
    EndpointTemplate::new(Method::Post, "/channels/{channel_id}/messages", &["channel_id"]);
pub const EDIT_MESSAGE: EndpointTemplate = EndpointTemplate::new(
    Method::Patch,
    "/channels/{channel_id}/messages/{message_id}",
    &["channel_id"],
);
pub const DELETE_MESSAGE: EndpointTemplate = EndpointTemplate::new(
    Method::Delete,
    "/channels/{channel_id}/messages/{message_id}",
    &["channel_id"],
);

pub const ADD_REACTION: EndpointTemplate = EndpointTemplate::new(
    Method::Put,
    "/channels/{channel_id}/messages/{message_id}/reactions/{emoji}/@me",
    &["channel_id", "message_id"],
);
pub const DELETE_REACTION: EndpointTemplate = EndpointTemplate::new(
    Method::Delete,
    "/channels/{channel_id}/messages/{message_id}/reactions/{emoji}/{who}",
    &["channel_id", "message_id"],
);
pub const DELETE_REACTIONS: EndpointTemplate = EndpointTemplate::new(
    Method::Delete,
    "/channels/{channel_id}/messages/{message_id}/reactions",
    &["channel_id", "message_id"],
);

pub const EDIT_GUILD_ROLE: EndpointTemplate =
    EndpointTemplate::new(Method::Patch, "/guilds/{guild_id}/roles/{role_id}", &[]);
pub const ADD_MEMBER_ROLE: EndpointTemplate = EndpointTemplate::new(
    Method::Put,
    "/guilds/{guild_id}/members/{user_id}/roles/{role_id}",
    &["guild_id"],
);
pub const REMOVE_MEMBER_ROLE: EndpointTemplate = EndpointTemplate::new(
    Method::Delete,
    "/guilds/{guild_id}/members/{user_id}/roles/{role_id}",
    &["guild_id"],
);

pub const CREATE_PRIVATE_CHANNEL: EndpointTemplate =
    EndpointTemplate::new(Method::Post, "/users/@me/channels", &[]);

/// Typed constructors for every endpoint the client uses
pub mod routes {
    use super::*;

    pub fn gateway() -> Route {
        GATEWAY.compile(&[])
    }

    pub fn send_message(channel_id: Snowflake) -> Route {
        SEND_MESSAGE.compile(&[&channel_id.to_string()])
    }

    pub fn edit_message(channel_id: Snowflake, message_id: Snowflake) -> Route {
        EDIT_MESSAGE.compile(&[&channel_id.to_string(), &message_id.to_string()])
    }

    pub fn delete_message(channel_id: Snowflake, message_id: Snowflake) -> Route {
        DELETE_MESSAGE.compile(&[&channel_id.to_string(), &message_id.to_string()])
    }

    pub fn add_reaction(channel_id: Snowflake, message_id: Snowflake, emoji: &Emoji) -> Route {
        ADD_REACTION.compile(&[
            &channel_id.to_string(),
            &message_id.to_string(),
            &emoji_segment(emoji),
        ])
    }

    /// Remove the current user's reaction
    pub fn delete_own_reaction(channel_id: Snowflake, message_id: Snowflake, emoji: &Emoji) -> Route {
        DELETE_REACTION.compile(&[
            &channel_id.to_string(),
            &message_id.to_string(),
            &emoji_segment(emoji),
            "@me",
        ])
    }

    /// Remove another user's reaction
    pub fn delete_user_reaction(
        channel_id: Snowflake,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: &Emoji,
    ) -> Route {
        DELETE_REACTION.compile(&[
            &channel_id.to_string(),
            &message_id.to_string(),
            &emoji_segment(emoji),
            &user_id.to_string(),
        ])
    }

    pub fn delete_reactions(channel_id: Snowflake, message_id: Snowflake) -> Route {
        DELETE_REACTIONS.compile(&[&channel_id.to_string(), &message_id.to_string()])
    }

    pub fn edit_guild_role(guild_id: Snowflake, role_id: Snowflake) -> Route {
        EDIT_GUILD_ROLE.compile(&[&guild_id.to_string(), &role_id.to_string()])
    }

    pub fn add_member_role(guild_id: Snowflake, user_id: Snowflake, role_id: Snowflake) -> Route {
        ADD_MEMBER_ROLE.compile(&[
            &guild_id.to_string(),
            &user_id.to_string(),
            &role_id.to_string(),
        ])
    }

    pub fn remove_member_role(guild_id: Snowflake, user_id: Snowflake, role_id: Snowflake) -> Route {
        REMOVE_MEMBER_ROLE.compile(&[
            &guild_id.to_string(),
            &user_id.to_string(),
            &role_id.to_string(),
        ])
    }

    pub fn create_private_channel() -> Route {
        CREATE_PRIVATE_CHANNEL.compile(&[])
    }
}
