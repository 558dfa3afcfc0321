//! GUILD_MEMBER_ADD / GUILD_MEMBER_UPDATE / GUILD_MEMBER_REMOVE / GUILD_MEMBERS_CHUNK

use chat_core::{EntityKey, Event, GuildMember, User};
use serde_json::Value;

use super::{id, Dispatcher, HandlerResult};
use crate::events::{GuildMemberRemoveEvent, GuildMembersChunkEvent};

impl Dispatcher {
    pub(super) fn member_add(&self, data: &Value) -> HandlerResult<()> {
        let guild_id = id(data, "guild_id")?;
        if !self.guild_known(guild_id) {
            return Ok(());
        }
        if let Some(member) = self.put_member(data, guild_id) {
            self.publish(Event::MemberAdd { member });
        }
        Ok(())
    }

    pub(super) fn member_update(&self, data: &Value) -> HandlerResult<()> {
        let guild_id = id(data, "guild_id")?;
        let user = data.get("user").unwrap_or(&Value::Null);
        let user_id = id(user, "id")?;

        self.refresh::<GuildMember>(EntityKey::Member { guild_id, user_id }, data);
        self.refresh::<User>(EntityKey::User(user_id), user);
        Ok(())
    }

    pub(super) fn member_remove(&self, data: &Value) -> HandlerResult<()> {
        let event: GuildMemberRemoveEvent = serde_json::from_value(data.clone())?;
        let key = EntityKey::Member {
            guild_id: event.guild_id,
            user_id: event.user.id,
        };
        if self.store.remove(&key).is_some() {
            self.publish(Event::MemberRemove {
                guild_id: event.guild_id,
                user_id: event.user.id,
            });
        }
        Ok(())
    }

    pub(super) fn members_chunk(&self, data: &Value) -> HandlerResult<()> {
        let event: GuildMembersChunkEvent = serde_json::from_value(data.clone())?;
        if !self.guild_known(event.guild_id) {
            return Ok(());
        }
        let loaded = event
            .members
            .iter()
            .filter_map(|member| self.put_member(member, event.guild_id))
            .count();
        tracing::debug!(guild_id = %event.guild_id, loaded, "Member chunk received");
        Ok(())
    }
}
