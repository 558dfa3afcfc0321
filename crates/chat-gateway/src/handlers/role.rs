//! GUILD_ROLE_CREATE / GUILD_ROLE_UPDATE / GUILD_ROLE_DELETE

use chat_core::{EntityKey, Event, Role};
use serde_json::Value;

use super::{id, Dispatcher, HandlerResult};
use crate::events::{GuildRoleDeleteEvent, GuildRoleEvent};

impl Dispatcher {
    pub(super) fn role_create(&self, data: &Value) -> HandlerResult<()> {
        let event: GuildRoleEvent = serde_json::from_value(data.clone())?;
        if !self.guild_known(event.guild_id) {
            return Ok(());
        }
        let role = Role::from_json(&event.role, event.guild_id)?;
        self.store.put(role.clone().into());
        self.publish(Event::RoleCreate { role });
        Ok(())
    }

    pub(super) fn role_update(&self, data: &Value) -> HandlerResult<()> {
        let event: GuildRoleEvent = serde_json::from_value(data.clone())?;
        let role_id = id(&event.role, "id")?;
        self.refresh::<Role>(EntityKey::Role(role_id), &event.role);
        Ok(())
    }

    pub(super) fn role_delete(&self, data: &Value) -> HandlerResult<()> {
        let event: GuildRoleDeleteEvent = serde_json::from_value(data.clone())?;
        if self.store.remove(&EntityKey::Role(event.role_id)).is_some() {
            self.publish(Event::RoleDelete {
                guild_id: event.guild_id,
                role_id: event.role_id,
            });
        }
        Ok(())
    }
}
