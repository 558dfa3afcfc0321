//! Local/server clock offset
//!
//! Rate-limit reset times are server timestamps. The offset between the local
//! clock and the server clock is taken once, from the `Date` header of the
//! first response that carries one, and reused for every bucket afterwards.

use std::sync::{Arc, LazyLock, OnceLock};

use crate::request::HttpResponse;

static PROCESS_CLOCK: LazyLock<Arc<ClockOffset>> = LazyLock::new(|| Arc::new(ClockOffset::new()));

/// Signed millisecond offset `server - local`
#[derive(Debug, Default)]
pub struct ClockOffset {
    offset_ms: OnceLock<i64>,
}

impl ClockOffset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The offset shared by every dispatcher in this process
    pub fn process() -> Arc<Self> {
        Arc::clone(&PROCESS_CLOCK)
    }

    /// Offset in milliseconds, once known
    pub fn offset_ms(&self) -> Option<i64> {
        self.offset_ms.get().copied()
    }

    /// Record the offset from `response` unless it is already known
    pub fn observe(&self, response: &HttpResponse) {
        if self.offset_ms.get().is_some() {
            return;
        }
        let Some(server_ms) = response.header("date").and_then(parse_http_date) else {
            return;
        };
        let offset = server_ms - local_now_ms();
        if self.offset_ms.set(offset).is_ok() {
            tracing::debug!(offset_ms = offset, "Server clock offset computed");
        }
    }

    /// Current time on the server clock (local time until the offset is known)
    pub fn server_now_ms(&self) -> i64 {
        local_now_ms() + self.offset_ms().unwrap_or(0)
    }
}

/// Local wall clock in epoch milliseconds
pub fn local_now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Parse an RFC 1123 HTTP date into epoch milliseconds
pub fn parse_http_date(value: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|date| date.timestamp_millis())
}
