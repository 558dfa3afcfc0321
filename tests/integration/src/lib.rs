//! Integration test utilities
//!
//! An in-process fake of the chat platform: a REST API and a zlib-stream
//! WebSocket gateway the tests drive frame by frame.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
