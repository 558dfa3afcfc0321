//! Gateway events
//!
//! Dispatch event names and the id-only payload shapes.

mod event_types;
mod payloads;

pub use event_types::GatewayEventType;
pub use payloads::{
    GuildDeleteEvent, GuildEmojisUpdateEvent, GuildMemberRemoveEvent, GuildMembersChunkEvent,
    GuildRoleDeleteEvent, GuildRoleEvent, MessageDeleteBulkEvent, MessageDeleteEvent,
    MessageReactionEvent, MessageReactionRemoveAllEvent, ReadyEvent, UserIdPayload,
};
