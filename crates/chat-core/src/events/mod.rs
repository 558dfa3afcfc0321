//! Domain events published to an `EventSink`

mod domain_event;

pub use domain_event::Event;
