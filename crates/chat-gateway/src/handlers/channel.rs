//! CHANNEL_CREATE / CHANNEL_UPDATE / CHANNEL_DELETE

use chat_core::{Channel, ChannelType, EntityKey, EntityKind, Event, StoreExt};
use serde_json::Value;

use super::{id, Dispatcher, HandlerResult};

impl Dispatcher {
    pub(super) fn channel_create(&self, data: &Value) -> HandlerResult<()> {
        let channel = Channel::from_json(data, None)?;
        match channel.channel_type {
            ChannelType::GuildText | ChannelType::GuildVoice | ChannelType::GuildCategory => {
                let guild_id = id(data, "guild_id")?;
                if !self.guild_known(guild_id) {
                    return Ok(());
                }
                self.store.put(channel.clone().into());
                self.publish(Event::ChannelCreate { channel });
            }
            ChannelType::Dm => {
                // Only track DMs with users already seen elsewhere
                let Some(recipient) = channel.recipient_id else {
                    return Ok(());
                };
                if self.store.user(recipient).is_some() {
                    self.store.put(channel.clone().into());
                    self.publish(Event::ChannelCreate { channel });
                }
            }
            ChannelType::GroupDm => {}
        }
        Ok(())
    }

    pub(super) fn channel_update(&self, data: &Value) -> HandlerResult<()> {
        let channel_id = id(data, "id")?;
        if let Some(cached) = self.store.channel(channel_id) {
            if cached.is_guild_channel() {
                self.refresh::<Channel>(EntityKey::Channel(channel_id), data);
            }
        }
        Ok(())
    }

    pub(super) fn channel_delete(&self, data: &Value) -> HandlerResult<()> {
        let channel_id = id(data, "id")?;
        let key = EntityKey::Channel(channel_id);
        let Some(channel) = self.store.channel(channel_id) else {
            return Ok(());
        };
        if !channel.is_guild_channel() {
            return Ok(());
        }

        for message in self.store.children(EntityKind::Message, key) {
            self.store.remove(&message.key());
        }
        self.store.remove(&key);
        self.publish(Event::ChannelDelete {
            channel_id,
            guild_id: channel.guild_id,
        });
        Ok(())
    }
}
