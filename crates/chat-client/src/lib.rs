//! # chat-client
//!
//! Client facade. Wires configuration, the rate-limited REST client, the
//! entity store, the event stream and the gateway shards together.

mod client;
mod error;

pub use client::{Client, ClientBuilder, DEFAULT_EVENT_CAPACITY, REQUEST_TIMEOUT};
pub use error::{ClientError, ClientResult};

pub use chat_common::{init_tracing, try_init_tracing, ClientConfig, TracingConfig};
pub use chat_core::{Emoji, Event, Snowflake};
pub use chat_gateway::{ActivityType, Status};
