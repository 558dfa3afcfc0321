//! Collaborator traits (ports) consumed by the gateway and client layers

mod sink;
mod store;

pub use sink::EventSink;
pub use store::{EntityStore, StoreExt, StoreResult};
