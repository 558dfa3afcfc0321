//! Gateway connection
//!
//! Session state machine, heartbeat timer and the socket tasks.

mod heartbeat;
mod session;
mod socket;
mod state;

pub use heartbeat::Heartbeat;
pub use session::{GatewaySession, CONNECT_ATTEMPTS};
pub use socket::{GatewaySocket, Outbound};
pub use state::SessionState;
