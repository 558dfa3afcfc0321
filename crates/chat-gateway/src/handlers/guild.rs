//! GUILD_CREATE / GUILD_UPDATE / GUILD_DELETE / GUILD_EMOJIS_UPDATE

use chat_core::{Channel, EntityKey, Event, Guild, GuildMember, Role, Snowflake, StoreExt};
use serde_json::Value;

use super::{array, id, Dispatcher, Followup, HandlerResult};
use crate::events::{GuildDeleteEvent, GuildEmojisUpdateEvent};

impl Dispatcher {
    pub(super) fn guild_create(&self, data: &Value) -> HandlerResult<Vec<Followup>> {
        if data.get("unavailable").and_then(Value::as_bool).unwrap_or(false) {
            tracing::debug!(shard_id = self.shard_id, "Skipping unavailable guild");
            return Ok(Vec::new());
        }

        let guild = Guild::from_json(data)?;
        let guild_id = guild.id;

        for channel in array(data, "channels") {
            match Channel::from_json(channel, Some(guild_id)) {
                Ok(channel) => self.store.put(channel.into()),
                Err(e) => tracing::warn!(guild_id = %guild_id, error = %e, "Skipping malformed channel"),
            }
        }
        for role in array(data, "roles") {
            match Role::from_json(role, guild_id) {
                Ok(role) => self.store.put(role.into()),
                Err(e) => tracing::warn!(guild_id = %guild_id, error = %e, "Skipping malformed role"),
            }
        }
        let members = array(data, "members");
        for member in members {
            self.put_member(member, guild_id);
        }

        self.store.put(guild.clone().into());
        tracing::info!(
            shard_id = self.shard_id,
            guild_id = %guild_id,
            name = %guild.name,
            "Guild available"
        );

        let mut followups = vec![Followup::GuildAvailable(guild_id)];
        if guild.member_count > members.len() as u64 {
            tracing::info!(
                guild_id = %guild_id,
                expected = guild.member_count,
                loaded = members.len(),
                "Requesting member chunks"
            );
            followups.push(Followup::RequestMembers(guild_id));
        }

        self.publish(Event::GuildCreate { guild });
        Ok(followups)
    }

    pub(super) fn guild_update(&self, data: &Value) -> HandlerResult<()> {
        let guild_id = id(data, "id")?;
        self.refresh::<Guild>(EntityKey::Guild(guild_id), data);
        Ok(())
    }

    pub(super) fn guild_delete(&self, data: &Value) -> HandlerResult<Vec<Followup>> {
        let event: GuildDeleteEvent = serde_json::from_value(data.clone())?;
        if self.store.remove_guild(event.id).is_some() {
            tracing::info!(
                shard_id = self.shard_id,
                guild_id = %event.id,
                unavailable = event.unavailable,
                "Guild removed"
            );
            self.publish(Event::GuildDelete { guild_id: event.id });
        }
        Ok(vec![Followup::GuildRemoved(event.id)])
    }

    pub(super) fn guild_emojis_update(&self, data: &Value) -> HandlerResult<()> {
        let event: GuildEmojisUpdateEvent = serde_json::from_value(data.clone())?;
        let Some(mut guild) = self.store.guild(event.guild_id) else {
            return Ok(());
        };
        if guild.emojis == event.emojis {
            return Ok(());
        }

        let old = serde_json::to_value(&guild.emojis)?;
        let new = serde_json::to_value(&event.emojis)?;
        guild.emojis = event.emojis;
        self.store.put(guild.into());
        self.publish(Event::FieldChanged {
            target: EntityKey::Guild(event.guild_id),
            field: "emojis",
            old,
            new,
        });
        Ok(())
    }

    /// Cache a member payload and its nested user
    pub(super) fn put_member(&self, data: &Value, guild_id: Snowflake) -> Option<GuildMember> {
        let member = match GuildMember::from_json(data, guild_id) {
            Ok(member) => member,
            Err(e) => {
                tracing::warn!(guild_id = %guild_id, error = %e, "Skipping malformed member");
                return None;
            }
        };
        if let Some(user) = data.get("user") {
            if let Err(e) = self.put_user(user) {
                tracing::warn!(guild_id = %guild_id, error = %e, "Skipping malformed user");
            }
        }
        self.store.put(member.clone().into());
        Some(member)
    }
}
