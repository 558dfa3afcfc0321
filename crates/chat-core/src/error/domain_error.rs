//! Domain errors - failures while turning raw payloads into domain records

use thiserror::Error;

use crate::entities::EntityKey;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Payload Errors
    // =========================================================================
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    // =========================================================================
    // Lookup Errors
    // =========================================================================
    #[error("Unknown entity: {0}")]
    UnknownEntity(EntityKey),

    #[error("Entity kind mismatch for {0}")]
    KindMismatch(EntityKey),
}

impl DomainError {
    /// Get a stable error code string for logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::InvalidField { .. } => "INVALID_FIELD",
            Self::Malformed(_) => "MALFORMED_PAYLOAD",
            Self::UnknownEntity(_) => "UNKNOWN_ENTITY",
            Self::KindMismatch(_) => "KIND_MISMATCH",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownEntity(_))
    }

    /// Check if the payload itself was at fault
    pub fn is_payload(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_) | Self::InvalidField { .. } | Self::Malformed(_)
        )
    }
}
