//! Gateway protocol definitions
//!
//! Op codes, close codes, the envelope format and the payloads the client sends.

pub mod close_codes;
mod intents;
mod messages;
mod opcodes;
mod payloads;

pub use close_codes::{CloseCode, NORMAL_CLOSE, RECONNECT_CLOSE};
pub use intents::GatewayIntents;
pub use messages::GatewayEnvelope;
pub use opcodes::{Direction, OpCode};
pub use payloads::{
    Activity, ActivityType, HelloPayload, IdentifyPayload, IdentifyProperties, PresenceUpdatePayload,
    RequestGuildMembersPayload, ResumePayload, Status,
};
