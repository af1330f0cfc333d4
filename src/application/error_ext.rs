//! Error conversion helpers for I/O at the collaborator seams
//!
//! Provides extension traits for cleaner error handling with context.

use std::io;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add store context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// self.store.replace(&buf)
    ///     .with_store_context("save", &self.store.describe())?;
    /// ```
    fn with_store_context(self, action: &str, store: &str) -> ApplicationResult<T>;

    /// Mark an I/O error as coming from the console.
    fn console_err(self) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_store_context(self, action: &str, store: &str) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, store),
            source: Box::new(e),
        })
    }

    fn console_err(self) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::Console { source })
    }
}
