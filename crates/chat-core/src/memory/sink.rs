//! Event sinks backed by a tokio broadcast channel or a plain buffer

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::events::Event;
use crate::traits::EventSink;

/// Default broadcast channel capacity
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Fans events out to every live subscriber
pub struct BroadcastSink {
    sender: broadcast::Sender<Event>,
}

impl BroadcastSink {
    /// Create a sink with a bounded per-subscriber backlog
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventSink for BroadcastSink {
    fn publish(&self, event: Event) {
        let event_type = event.event_type();
        if self.sender.send(event).is_err() {
            tracing::trace!(event = event_type, "No subscribers for event");
        }
    }
}

/// Buffers every published event in order
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<Event>>,
}

impl CollectingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events published so far
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Drain the buffered events
    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventSink for CollectingSink {
    fn publish(&self, event: Event) {
        self.events.lock().push(event);
    }
}
