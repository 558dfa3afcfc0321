//! Session lifecycle states

use std::fmt;

/// Lifecycle state of one gateway session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// No socket and no reconnect scheduled
    #[default]
    Disconnected,
    /// Resolving the URL and opening the socket
    Connecting,
    /// Socket open; identify or resume in flight or done
    Connected,
    /// Socket lost; a resume is scheduled
    Resuming,
    /// The gateway replayed the previous session
    Resumed,
    /// Closing on request; no reconnect will follow
    Disconnecting,
}

impl SessionState {
    /// Whether a socket is open and usable
    #[inline]
    #[must_use]
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected | Self::Resumed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "DISCONNECTED",
            Self::Connecting => "CONNECTING",
            Self::Connected => "CONNECTED",
            Self::Resuming => "RESUMING",
            Self::Resumed => "RESUMED",
            Self::Disconnecting => "DISCONNECTING",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
