//! In-process implementations of the collaborator traits

mod sink;
mod store;

pub use sink::{BroadcastSink, CollectingSink};
pub use store::MemoryEntityStore;
