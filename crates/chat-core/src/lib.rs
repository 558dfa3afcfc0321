//! # chat-core
//!
//! Domain layer containing snowflake ids, cached entity records, domain events,
//! and the collaborator traits (`EntityStore`, `EventSink`) the gateway and
//! REST layers call into. No network code lives here.

pub mod entities;
pub mod error;
pub mod events;
pub mod memory;
pub mod refresh;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Channel, ChannelType, Entity, EntityKey, EntityKind, Guild, GuildMember, Message,
    ReactionCount, Role, User,
};
pub use error::DomainError;
pub use events::Event;
pub use memory::{BroadcastSink, CollectingSink, MemoryEntityStore};
pub use refresh::{FieldChange, FieldDescriptor, Refresh};
pub use traits::{EntityStore, EventSink, StoreExt, StoreResult};
pub use value_objects::{Emoji, Snowflake, SnowflakeParseError};
