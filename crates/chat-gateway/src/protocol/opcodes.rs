//! Gateway operation codes

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Which side of the socket may send an op
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Server to client
    Inbound,
    /// Client to server
    Outbound,
    /// Either side
    Both,
}

/// Gateway operation codes
///
/// Values 4 and 5 belong to voice and are never seen on this socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    Dispatch = 0,
    Heartbeat = 1,
    Identify = 2,
    PresenceUpdate = 3,
    Resume = 6,
    Reconnect = 7,
    RequestGuildMembers = 8,
    InvalidSession = 9,
    Hello = 10,
    HeartbeatAck = 11,
}

impl OpCode {
    /// Size of a table indexed by [`OpCode::slot`]
    pub const SLOTS: usize = 12;

    const ALL: [Self; 10] = [
        Self::Dispatch,
        Self::Heartbeat,
        Self::Identify,
        Self::PresenceUpdate,
        Self::Resume,
        Self::Reconnect,
        Self::RequestGuildMembers,
        Self::InvalidSession,
        Self::Hello,
        Self::HeartbeatAck,
    ];

    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_u8() == value)
    }

    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Index into a per-op table of length [`OpCode::SLOTS`]
    #[must_use]
    pub const fn slot(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Heartbeat => Direction::Both,
            Self::Identify | Self::PresenceUpdate | Self::Resume | Self::RequestGuildMembers => {
                Direction::Outbound
            }
            Self::Dispatch | Self::Reconnect | Self::InvalidSession | Self::Hello | Self::HeartbeatAck => {
                Direction::Inbound
            }
        }
    }

    /// Whether the server may send this op
    #[must_use]
    pub const fn is_inbound(self) -> bool {
        !matches!(self.direction(), Direction::Outbound)
    }

    /// Whether the client may send this op
    #[must_use]
    pub const fn is_outbound(self) -> bool {
        !matches!(self.direction(), Direction::Inbound)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dispatch => "Dispatch",
            Self::Heartbeat => "Heartbeat",
            Self::Identify => "Identify",
            Self::PresenceUpdate => "PresenceUpdate",
            Self::Resume => "Resume",
            Self::Reconnect => "Reconnect",
            Self::RequestGuildMembers => "RequestGuildMembers",
            Self::InvalidSession => "InvalidSession",
            Self::Hello => "Hello",
            Self::HeartbeatAck => "HeartbeatAck",
        }
    }
}

impl TryFrom<u8> for OpCode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or(value)
    }
}

impl Serialize for OpCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for OpCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u8::deserialize(deserializer)?;
        Self::try_from(raw).map_err(|op| serde::de::Error::custom(format_args!("unknown op code {op}")))
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.as_u8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_op_round_trips_through_its_value() {
        for op in OpCode::ALL {
            assert_eq!(OpCode::from_u8(op.as_u8()), Some(op));
            assert!(op.slot() < OpCode::SLOTS);
        }
    }

    #[test]
    fn test_voice_values_are_rejected() {
        assert_eq!(OpCode::try_from(4), Err(4));
        assert_eq!(OpCode::try_from(5), Err(5));
        assert_eq!(OpCode::from_u8(12), None);
    }

    #[test]
    fn test_direction() {
        assert_eq!(OpCode::Heartbeat.direction(), Direction::Both);
        assert!(OpCode::Heartbeat.is_inbound() && OpCode::Heartbeat.is_outbound());

        assert!(OpCode::RequestGuildMembers.is_outbound());
        assert!(!OpCode::Resume.is_inbound());

        assert!(OpCode::InvalidSession.is_inbound());
        assert!(!OpCode::Hello.is_outbound());
    }

    #[test]
    fn test_wire_form_is_a_bare_integer() {
        assert_eq!(serde_json::to_string(&OpCode::Resume).unwrap(), "6");
        assert_eq!(serde_json::from_str::<OpCode>("9").unwrap(), OpCode::InvalidSession);
        assert!(serde_json::from_str::<OpCode>("5").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(OpCode::HeartbeatAck.to_string(), "HeartbeatAck(11)");
    }
}
