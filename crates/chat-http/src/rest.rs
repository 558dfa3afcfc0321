//! Typed REST operations
//!
//! Thin wrappers that build the route and body for each operation, send them
//! through an [`HttpClient`] and decode the response into domain records.

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use chat_core::{Channel, Emoji, Message, Role, Snowflake};

use crate::client::HttpClient;
use crate::endpoint::{routes, Route};
use crate::error::HttpError;
use crate::request::RequestFlags;

/// Maximum message content length in characters
pub const MESSAGE_MAX_LENGTH: usize = 2000;

/// Changes to apply to a message
#[derive(Debug, Clone, Default, Serialize)]
pub struct MessageEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed: Option<Value>,
}

impl MessageEdit {
    #[must_use]
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            embed: None,
        }
    }

    #[must_use]
    pub fn with_embed(mut self, embed: Value) -> Self {
        self.embed = Some(embed);
        self
    }
}

/// Changes to apply to a role
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoleEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoist: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentionable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<u64>,
}

impl RoleEdit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn with_hoist(mut self, hoist: bool) -> Self {
        self.hoist = Some(hoist);
        self
    }

    #[must_use]
    pub fn with_mentionable(mut self, mentionable: bool) -> Self {
        self.mentionable = Some(mentionable);
        self
    }
}

/// REST API operations over any [`HttpClient`]
#[derive(Clone)]
pub struct RestClient {
    http: Arc<dyn HttpClient>,
}

impl RestClient {
    #[must_use]
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    /// The underlying client
    pub fn http(&self) -> &Arc<dyn HttpClient> {
        &self.http
    }

    async fn send(&self, route: Route, body: Option<Value>) -> Result<Option<Value>, HttpError> {
        self.http.json(route, body, RequestFlags::empty()).await
    }

    async fn send_expecting(&self, route: Route, body: Option<Value>) -> Result<Value, HttpError> {
        self.send(route, body)
            .await?
            .ok_or_else(|| HttpError::InvalidRequest("empty response body".to_string()))
    }

    /// Look up the gateway URL (unauthenticated)
    pub async fn gateway_url(&self) -> Result<String, HttpError> {
        let body = self
            .http
            .json(routes::gateway(), None, RequestFlags::UNAUTHENTICATED)
            .await?;
        body.as_ref()
            .and_then(|b| b.get("url"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| HttpError::InvalidRequest("gateway response has no url".to_string()))
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// Post a message to a channel
    pub async fn send_message(
        &self,
        channel_id: Snowflake,
        content: &str,
        embed: Option<Value>,
    ) -> Result<Message, HttpError> {
        check_length(content)?;
        let mut body = json!({ "content": content });
        if let Some(embed) = embed {
            body["embed"] = rich(embed);
        }
        let data = self.send_expecting(routes::send_message(channel_id), Some(body)).await?;
        Ok(Message::from_json(&data)?)
    }

    /// Edit a message; unset fields are left unchanged
    pub async fn edit_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        edit: MessageEdit,
    ) -> Result<Message, HttpError> {
        if let Some(content) = &edit.content {
            check_length(content)?;
        }
        let mut body = serde_json::to_value(&edit)?;
        if let Some(embed) = body.get_mut("embed") {
            *embed = rich(embed.take());
        }
        let data = self
            .send_expecting(routes::edit_message(channel_id, message_id), Some(body))
            .await?;
        Ok(Message::from_json(&data)?)
    }

    pub async fn delete_message(&self, channel_id: Snowflake, message_id: Snowflake) -> Result<(), HttpError> {
        self.send(routes::delete_message(channel_id, message_id), None).await?;
        Ok(())
    }

    // =========================================================================
    // Reactions
    // =========================================================================

    /// React to a message as the current user
    pub async fn add_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &Emoji,
    ) -> Result<(), HttpError> {
        self.send(routes::add_reaction(channel_id, message_id, emoji), None)
            .await?;
        Ok(())
    }

    /// Remove the current user's reaction
    pub async fn delete_own_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &Emoji,
    ) -> Result<(), HttpError> {
        self.send(routes::delete_own_reaction(channel_id, message_id, emoji), None)
            .await?;
        Ok(())
    }

    /// Remove another user's reaction
    pub async fn delete_user_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: &Emoji,
    ) -> Result<(), HttpError> {
        self.send(
            routes::delete_user_reaction(channel_id, message_id, user_id, emoji),
            None,
        )
        .await?;
        Ok(())
    }

    /// Remove every reaction on a message
    pub async fn delete_all_reactions(&self, channel_id: Snowflake, message_id: Snowflake) -> Result<(), HttpError> {
        self.send(routes::delete_reactions(channel_id, message_id), None)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Guilds
    // =========================================================================

    pub async fn edit_role(&self, guild_id: Snowflake, role_id: Snowflake, edit: RoleEdit) -> Result<Role, HttpError> {
        let body = serde_json::to_value(&edit)?;
        let data = self
            .send_expecting(routes::edit_guild_role(guild_id, role_id), Some(body))
            .await?;
        Ok(Role::from_json(&data, guild_id)?)
    }

    pub async fn add_member_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
    ) -> Result<(), HttpError> {
        self.send(routes::add_member_role(guild_id, user_id, role_id), None)
            .await?;
        Ok(())
    }

    pub async fn remove_member_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
    ) -> Result<(), HttpError> {
        self.send(routes::remove_member_role(guild_id, user_id, role_id), None)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Open (or fetch) the DM channel with a user
    pub async fn create_private_channel(&self, recipient_id: Snowflake) -> Result<Channel, HttpError> {
        let body = json!({ "recipient_id": recipient_id });
        let data = self
            .send_expecting(routes::create_private_channel(), Some(body))
            .await?;
        let mut channel = Channel::from_json(&data, None)?;
        channel.recipient_id.get_or_insert(recipient_id);
        Ok(channel)
    }
}

fn check_length(content: &str) -> Result<(), HttpError> {
    let length = content.chars().count();
    if length > MESSAGE_MAX_LENGTH {
        return Err(HttpError::InvalidRequest(format!(
            "content too long; {length} > {MESSAGE_MAX_LENGTH}"
        )));
    }
    Ok(())
}

/// Outgoing embeds are always rich embeds
fn rich(mut embed: Value) -> Value {
    if let Some(object) = embed.as_object_mut() {
        object.insert("type".to_string(), Value::from("rich"));
    }
    embed
}
