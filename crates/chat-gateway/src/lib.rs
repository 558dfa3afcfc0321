//! # chat-gateway
//!
//! WebSocket gateway client: wire protocol, zlib-stream codec, the per-shard
//! session state machine and the shard registry.

pub mod codec;
pub mod connection;
pub mod error;
pub mod events;
pub mod handlers;
pub mod protocol;
pub mod shard;
pub mod url;

pub use codec::Inflater;
pub use connection::{GatewaySession, SessionState};
pub use error::{CodecError, GatewayError, GatewayResult};
pub use handlers::{Dispatcher, Followup};
pub use protocol::{ActivityType, GatewayIntents, OpCode, PresenceUpdatePayload, Status};
pub use shard::ShardRegistry;
pub use url::GatewayUrl;
