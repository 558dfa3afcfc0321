//! Gateway envelope format
//!
//! Every frame on the socket, in both directions, is one envelope.

use super::OpCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gateway envelope: `{"op": int, "d": any, "s": int|null, "t": string|null}`
///
/// `op` is kept raw so that unknown op codes decode and can be logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayEnvelope {
    /// Operation code
    pub op: u8,

    /// Event data payload
    #[serde(default)]
    pub d: Value,

    /// Sequence number (only for op=0 Dispatch)
    #[serde(default)]
    pub s: Option<i64>,

    /// Event name (only for op=0 Dispatch)
    #[serde(default)]
    pub t: Option<String>,
}

impl GatewayEnvelope {
    /// Create an outbound envelope
    #[must_use]
    pub fn new(op: OpCode, d: Value) -> Self {
        Self {
            op: op.as_u8(),
            d,
            s: None,
            t: None,
        }
    }

    /// Create a Dispatch envelope (op=0)
    #[must_use]
    pub fn dispatch(event_name: impl Into<String>, sequence: i64, data: Value) -> Self {
        Self {
            op: OpCode::Dispatch.as_u8(),
            d: data,
            s: Some(sequence),
            t: Some(event_name.into()),
        }
    }

    /// Known op code, if any
    #[must_use]
    pub fn opcode(&self) -> Option<OpCode> {
        OpCode::from_u8(self.op)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Display for GatewayEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.t, self.s) {
            (Some(t), Some(s)) => write!(f, "GatewayEnvelope(op={}, t={t}, s={s})", self.op),
            (Some(t), None) => write!(f, "GatewayEnvelope(op={}, t={t})", self.op),
            _ => write!(f, "GatewayEnvelope(op={})", self.op),
        }
    }
}
