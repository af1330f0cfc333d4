//! Application layer: services and use cases
//!
//! This layer orchestrates the record tree and depends on I/O boundary traits.

pub mod edit;
pub mod error;
pub mod error_ext;
pub mod services;

pub use edit::{run_edit, EditChoice, EditOutcome, EditSession};
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
