//! Per-route bucket: request queue plus the last known rate-limit state

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;

use super::clock::ClockOffset;
use crate::error::HttpError;
use crate::request::{HttpRequest, HttpResponse};

/// A queued request and the caller waiting for it
pub(crate) struct Entry {
    pub request: HttpRequest,
    pub responder: oneshot::Sender<Result<HttpResponse, HttpError>>,
}

#[derive(Default)]
struct Queue {
    entries: VecDeque<Entry>,
    /// Set while a worker owns this queue
    worker_active: bool,
}

#[derive(Debug, Clone, Copy)]
struct Limit {
    remaining: i64,
    /// Server-clock epoch milliseconds
    reset_at_ms: i64,
}

/// Point-in-time view of a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketSnapshot {
    pub remaining: i64,
    pub reset_at_ms: i64,
    pub queued: usize,
    pub worker_active: bool,
}

pub(crate) struct Bucket {
    identity: String,
    queue: Mutex<Queue>,
    limit: Mutex<Limit>,
    last_access: Mutex<Instant>,
}

impl Bucket {
    pub fn new(identity: &str) -> Self {
        Self {
            identity: identity.to_string(),
            queue: Mutex::new(Queue::default()),
            // Unknown until the first response; assume one request is allowed
            limit: Mutex::new(Limit {
                remaining: 1,
                reset_at_ms: 0,
            }),
            last_access: Mutex::new(Instant::now()),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn touch(&self) {
        *self.last_access.lock() = Instant::now();
    }

    /// Append an entry. Returns true when the caller must start a worker.
    pub fn enqueue(&self, entry: Entry) -> bool {
        let mut queue = self.queue.lock();
        queue.entries.push_back(entry);
        if queue.worker_active {
            false
        } else {
            queue.worker_active = true;
            true
        }
    }

    /// Clone the head request, or release the worker flag if the queue is empty
    pub fn peek_or_release(&self) -> Option<HttpRequest> {
        let mut queue = self.queue.lock();
        match queue.entries.front() {
            Some(entry) => Some(entry.request.clone()),
            None => {
                queue.worker_active = false;
                None
            }
        }
    }

    /// Remove the head entry
    pub fn pop(&self) -> Option<Entry> {
        self.queue.lock().entries.pop_front()
    }

    /// Time to wait before the next request may be sent
    pub fn delay(&self, clock: &ClockOffset) -> Option<Duration> {
        let limit = *self.limit.lock();
        if limit.remaining > 0 {
            return None;
        }
        let wait = limit.reset_at_ms - clock.server_now_ms();
        u64::try_from(wait)
            .ok()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    /// Record a 429: nothing left until `retry_after_ms` from now
    pub fn rate_limited(&self, retry_after_ms: i64, clock: &ClockOffset) {
        let mut limit = self.limit.lock();
        limit.remaining = 0;
        limit.reset_at_ms = clock.server_now_ms() + retry_after_ms;
    }

    /// Record the rate-limit headers of a non-429 response
    pub fn update(&self, response: &HttpResponse) {
        let remaining = response
            .header("x-ratelimit-remaining")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(1);
        let reset_at_ms = response
            .header("x-ratelimit-reset")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .map_or(0, |secs| (secs * 1000.0) as i64);

        let mut limit = self.limit.lock();
        limit.remaining = remaining;
        limit.reset_at_ms = reset_at_ms;
    }

    /// Idle buckets hold no work and have not been touched for `ttl`
    pub fn is_idle(&self, ttl: Duration) -> bool {
        let queue = self.queue.lock();
        queue.entries.is_empty()
            && !queue.worker_active
            && self.last_access.lock().elapsed() >= ttl
    }

    pub fn snapshot(&self) -> BucketSnapshot {
        let limit = *self.limit.lock();
        let queue = self.queue.lock();
        BucketSnapshot {
            remaining: limit.remaining,
            reset_at_ms: limit.reset_at_ms,
            queued: queue.entries.len(),
            worker_active: queue.worker_active,
        }
    }
}

/// `retry_after` (milliseconds) from a 429 body, 0 if absent
pub(crate) fn retry_after_ms(response: &HttpResponse) -> i64 {
    serde_json::from_str::<serde_json::Value>(&response.body)
        .ok()
        .and_then(|body| body.get("retry_after").and_then(serde_json::Value::as_f64))
        .map_or(0, |ms| ms.ceil() as i64)
}
