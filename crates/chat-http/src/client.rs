//! HTTP clients: the common trait and the unthrottled implementation

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::endpoint::Route;
use crate::error::HttpError;
use crate::request::{HttpResponse, RequestFactory, RequestFlags};
use crate::transport::HttpTransport;

/// Sends routes to the API
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Send a request and return the raw response
    async fn execute(
        &self,
        route: Route,
        body: Option<Value>,
        flags: RequestFlags,
    ) -> Result<HttpResponse, HttpError>;

    /// Send a request and parse a successful response body as JSON
    async fn json(
        &self,
        route: Route,
        body: Option<Value>,
        flags: RequestFlags,
    ) -> Result<Option<Value>, HttpError> {
        self.execute(route, body, flags).await?.into_json()
    }
}

/// Sends every request immediately, with no rate-limit bookkeeping.
///
/// Used for the one-off gateway lookup before any bucket state exists.
pub struct ImmediateClient {
    factory: RequestFactory,
    transport: Arc<dyn HttpTransport>,
}

impl ImmediateClient {
    #[must_use]
    pub fn new(factory: RequestFactory, transport: Arc<dyn HttpTransport>) -> Self {
        Self { factory, transport }
    }
}

#[async_trait]
impl HttpClient for ImmediateClient {
    async fn execute(
        &self,
        route: Route,
        body: Option<Value>,
        flags: RequestFlags,
    ) -> Result<HttpResponse, HttpError> {
        let request = self.factory.prepare(&route, body.as_ref(), flags);
        tracing::debug!(method = %route.method, route = %route.identity, "Sending immediate request");
        self.transport.execute(request).await
    }
}
