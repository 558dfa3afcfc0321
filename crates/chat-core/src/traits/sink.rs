//! Event sink port

use crate::events::Event;

/// Receives decoded events in dispatch order. Publishing never fails from the
/// caller's point of view.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: Event);
}
