//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("no record matches {0}")]
    NotFound(String),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("console failed")]
    Console {
        #[source]
        source: std::io::Error,
    },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    /// Input ended while the console was waiting for an answer.
    pub fn is_end_of_input(&self) -> bool {
        matches!(
            self,
            ApplicationError::Console { source }
                if source.kind() == std::io::ErrorKind::UnexpectedEof
        )
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
