//! Domain entities - cached records built from gateway and REST payloads

mod channel;
mod guild;
mod key;
mod member;
mod message;
mod reaction;
mod role;
mod user;

pub use channel::{Channel, ChannelType};
pub use guild::Guild;
pub use key::{Entity, EntityKey, EntityKind};
pub use member::GuildMember;
pub use message::Message;
pub use reaction::ReactionCount;
pub use role::Role;
pub use user::User;
