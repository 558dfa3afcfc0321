//! MESSAGE_* and MESSAGE_REACTION_* dispatches
//!
//! Only guild messages are tracked; direct-message events are logged and dropped.

use chat_core::{Channel, EntityKey, Event, Message, Snowflake, StoreExt};
use serde_json::Value;

use super::{id, Dispatcher, HandlerResult};
use crate::events::{MessageDeleteBulkEvent, MessageDeleteEvent, MessageReactionEvent, MessageReactionRemoveAllEvent};

impl Dispatcher {
    /// Cached text channel of a known guild
    fn guild_text_channel(&self, guild_id: Snowflake, channel_id: Snowflake) -> Option<Channel> {
        self.store
            .channel(channel_id)
            .filter(|channel| channel.guild_id == Some(guild_id) && channel.is_text())
    }

    pub(super) fn message_create(&self, data: &Value) -> HandlerResult<()> {
        let Some(guild_id) = data.get("guild_id").and_then(Snowflake::from_json) else {
            tracing::warn!(shard_id = self.shard_id, "Ignoring non-guild message create");
            return Ok(());
        };
        let channel_id = id(data, "channel_id")?;
        if self.guild_text_channel(guild_id, channel_id).is_none() {
            return Ok(());
        }

        let message = Message::from_json(data)?;
        if let Some(author) = data.get("author") {
            self.put_user(author)?;
        }
        self.store.put(message.clone().into());
        self.publish(Event::MessageCreate { message });
        Ok(())
    }

    pub(super) fn message_update(&self, data: &Value) -> HandlerResult<()> {
        if data.get("guild_id").is_none() {
            tracing::warn!(shard_id = self.shard_id, "Ignoring non-guild message update");
            return Ok(());
        }
        let message_id = id(data, "id")?;
        self.refresh::<Message>(EntityKey::Message(message_id), data);
        Ok(())
    }

    pub(super) fn message_delete(&self, data: &Value) -> HandlerResult<()> {
        let event: MessageDeleteEvent = serde_json::from_value(data.clone())?;
        let Some(guild_id) = event.guild_id else {
            tracing::warn!(shard_id = self.shard_id, "Ignoring non-guild message delete");
            return Ok(());
        };
        if self.guild_text_channel(guild_id, event.channel_id).is_some() {
            self.delete_message(event.channel_id, event.id);
        }
        Ok(())
    }

    pub(super) fn message_delete_bulk(&self, data: &Value) -> HandlerResult<()> {
        let event: MessageDeleteBulkEvent = serde_json::from_value(data.clone())?;
        let Some(guild_id) = event.guild_id else {
            tracing::warn!(shard_id = self.shard_id, "Ignoring non-guild bulk message delete");
            return Ok(());
        };
        if self.guild_text_channel(guild_id, event.channel_id).is_some() {
            for message_id in event.ids {
                self.delete_message(event.channel_id, message_id);
            }
        }
        Ok(())
    }

    /// Deletes are published whether or not the message was cached
    fn delete_message(&self, channel_id: Snowflake, message_id: Snowflake) {
        self.store.remove(&EntityKey::Message(message_id));
        self.publish(Event::MessageDelete {
            channel_id,
            message_id,
        });
    }

    // =========================================================================
    // Reactions
    // =========================================================================

    pub(super) fn reaction_add(&self, data: &Value) -> HandlerResult<()> {
        let event: MessageReactionEvent = serde_json::from_value(data.clone())?;
        let Some(guild_id) = event.guild_id else {
            tracing::warn!(shard_id = self.shard_id, "Ignoring reaction on non-guild message");
            return Ok(());
        };
        if self.guild_text_channel(guild_id, event.channel_id).is_none() {
            return Ok(());
        }

        let me = self.current_user() == Some(event.user_id);
        if let Some(mut message) = self.store.message(event.message_id) {
            message.add_reaction(&event.emoji, me);
            self.store.put(message.into());
        }
        self.publish(Event::ReactionAdd {
            channel_id: event.channel_id,
            message_id: event.message_id,
            user_id: event.user_id,
            emoji: event.emoji,
        });
        Ok(())
    }

    pub(super) fn reaction_remove(&self, data: &Value) -> HandlerResult<()> {
        let event: MessageReactionEvent = serde_json::from_value(data.clone())?;
        let Some(guild_id) = event.guild_id else {
            tracing::warn!(shard_id = self.shard_id, "Ignoring reaction removal on non-guild message");
            return Ok(());
        };
        if self.guild_text_channel(guild_id, event.channel_id).is_none() {
            return Ok(());
        }

        let me = self.current_user() == Some(event.user_id);
        if let Some(mut message) = self.store.message(event.message_id) {
            message.remove_reaction(&event.emoji, me);
            self.store.put(message.into());
        }
        self.publish(Event::ReactionRemove {
            channel_id: event.channel_id,
            message_id: event.message_id,
            user_id: event.user_id,
            emoji: event.emoji,
        });
        Ok(())
    }

    pub(super) fn reaction_remove_all(&self, data: &Value) -> HandlerResult<()> {
        let event: MessageReactionRemoveAllEvent = serde_json::from_value(data.clone())?;
        let Some(guild_id) = event.guild_id else {
            tracing::warn!(shard_id = self.shard_id, "Ignoring reaction clear on non-guild message");
            return Ok(());
        };
        if self.guild_text_channel(guild_id, event.channel_id).is_none() {
            return Ok(());
        }

        if let Some(mut message) = self.store.message(event.message_id) {
            message.clear_reactions();
            self.store.put(message.into());
        }
        self.publish(Event::ReactionClear {
            channel_id: event.channel_id,
            message_id: event.message_id,
        });
        Ok(())
    }
}
