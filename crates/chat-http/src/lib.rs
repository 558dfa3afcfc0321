//! # chat-http
//!
//! REST side of the client: endpoint templates with major-parameter route
//! identities, request preparation, the transport seam, the unthrottled
//! `ImmediateClient`, the bucketed `RateLimitedDispatcher`, and typed
//! operations on top (`RestClient`).

pub mod client;
pub mod endpoint;
pub mod error;
pub mod ratelimit;
pub mod request;
pub mod rest;
pub mod transport;

#[cfg(test)]
mod test_support;

// Re-export commonly used types at crate root
pub use client::{HttpClient, ImmediateClient};
pub use endpoint::{routes, EndpointTemplate, Method, Route};
pub use error::HttpError;
pub use ratelimit::{BucketSnapshot, ClockOffset, RateLimitedDispatcher, DEFAULT_BUCKET_IDLE};
pub use request::{HttpRequest, HttpResponse, RequestFactory, RequestFlags, USER_AGENT};
pub use rest::{MessageEdit, RestClient, RoleEdit, MESSAGE_MAX_LENGTH};
pub use transport::{HttpTransport, ReqwestTransport};
