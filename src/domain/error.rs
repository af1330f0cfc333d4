//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent record and tree invariant violations.
/// These are independent of configuration and terminal concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("stream error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt record at byte {offset}: {reason}")]
    CorruptRecord { offset: u64, reason: String },

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl DomainError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
