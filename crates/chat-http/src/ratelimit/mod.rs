//! Rate-limited request dispatcher
//!
//! Requests are grouped into buckets by route identity. Each bucket drains its
//! queue with at most one worker task at a time, so requests in one bucket go
//! out strictly in submission order while different buckets run in parallel.

mod bucket;
mod clock;

pub use bucket::BucketSnapshot;
pub use clock::{local_now_ms, parse_http_date, ClockOffset};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

use self::bucket::{retry_after_ms, Bucket, Entry};
use crate::client::HttpClient;
use crate::endpoint::Route;
use crate::error::HttpError;
use crate::request::{HttpRequest, HttpResponse, RequestFactory, RequestFlags};
use crate::transport::HttpTransport;

/// Default idle time after which an unused bucket is dropped
pub const DEFAULT_BUCKET_IDLE: Duration = Duration::from_secs(300);

struct Inner {
    factory: RequestFactory,
    transport: Arc<dyn HttpTransport>,
    buckets: DashMap<String, Arc<Bucket>>,
    clock: Arc<ClockOffset>,
    idle_ttl: Duration,
}

/// Queues requests per route identity and honors the server's rate limits
#[derive(Clone)]
pub struct RateLimitedDispatcher {
    inner: Arc<Inner>,
}

impl RateLimitedDispatcher {
    /// Create a dispatcher sharing the process-wide clock offset
    #[must_use]
    pub fn new(factory: RequestFactory, transport: Arc<dyn HttpTransport>, idle_ttl: Duration) -> Self {
        Self::with_clock(factory, transport, idle_ttl, ClockOffset::process())
    }

    /// Create a dispatcher with its own clock offset
    #[must_use]
    pub fn with_clock(
        factory: RequestFactory,
        transport: Arc<dyn HttpTransport>,
        idle_ttl: Duration,
        clock: Arc<ClockOffset>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                factory,
                transport,
                buckets: DashMap::new(),
                clock,
                idle_ttl,
            }),
        }
    }

    pub fn clock(&self) -> &ClockOffset {
        &self.inner.clock
    }

    /// Number of live buckets
    pub fn bucket_count(&self) -> usize {
        self.inner.buckets.len()
    }

    /// State of the bucket for `identity`, if one exists
    pub fn bucket_snapshot(&self, identity: &str) -> Option<BucketSnapshot> {
        self.inner.buckets.get(identity).map(|b| b.snapshot())
    }

    /// Queue `request` in the bucket for `identity` and wait for its response.
    ///
    /// 429 answers are retried transparently; the result is the first non-429
    /// response or the transport error that ended the attempt.
    pub async fn submit(&self, identity: &str, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.evict_idle();

        let bucket = self.bucket(identity);
        let (responder, response) = oneshot::channel();
        if bucket.enqueue(Entry { request, responder }) {
            tracing::trace!(route = %identity, "Starting bucket worker");
            tokio::spawn(drain(Arc::clone(&self.inner), bucket));
        }

        response.await.map_err(|_| HttpError::WorkerDropped)?
    }

    fn bucket(&self, identity: &str) -> Arc<Bucket> {
        let entry = self
            .inner
            .buckets
            .entry(identity.to_string())
            .or_insert_with(|| Arc::new(Bucket::new(identity)));
        // Touch while the shard is locked so a concurrent sweep sees it
        entry.touch();
        Arc::clone(entry.value())
    }

    /// Drop buckets that hold no work and have been idle for the TTL
    pub fn evict_idle(&self) {
        let ttl = self.inner.idle_ttl;
        self.inner.buckets.retain(|identity, bucket| {
            let keep = !bucket.is_idle(ttl);
            if !keep {
                tracing::trace!(route = %identity, "Evicting idle bucket");
            }
            keep
        });
    }
}

/// Worker loop for one bucket. Exits once the queue is empty.
async fn drain(inner: Arc<Inner>, bucket: Arc<Bucket>) {
    while let Some(request) = bucket.peek_or_release() {
        if let Some(delay) = bucket.delay(&inner.clock) {
            tracing::debug!(
                route = %bucket.identity(),
                delay_ms = delay.as_millis() as u64,
                "Bucket exhausted, waiting for reset"
            );
            tokio::time::sleep(delay).await;
        }

        match inner.transport.execute(request).await {
            Ok(response) => {
                inner.clock.observe(&response);

                if response.is_rate_limited() {
                    let retry_after = retry_after_ms(&response);
                    tracing::warn!(
                        route = %bucket.identity(),
                        retry_after_ms = retry_after,
                        "Rate limited, request stays queued"
                    );
                    bucket.rate_limited(retry_after, &inner.clock);
                    continue;
                }

                bucket.update(&response);
                if let Some(entry) = bucket.pop() {
                    // The caller may have stopped waiting
                    let _ = entry.responder.send(Ok(response));
                }
            }
            Err(err) => {
                tracing::error!(route = %bucket.identity(), error = %err, "Request failed");
                if let Some(entry) = bucket.pop() {
                    let _ = entry.responder.send(Err(err));
                }
            }
        }
    }
    tracing::trace!(route = %bucket.identity(), "Bucket worker finished");
}

#[async_trait]
impl HttpClient for RateLimitedDispatcher {
    async fn execute(
        &self,
        route: Route,
        body: Option<Value>,
        flags: RequestFlags,
    ) -> Result<HttpResponse, HttpError> {
        let request = self.inner.factory.prepare(&route, body.as_ref(), flags);
        self.submit(&route.identity, request).await
    }
}
