//! Infrastructure layer: terminal and storage implementations
//!
//! This layer implements the I/O boundary traits used by the services.

pub mod terminal;
pub mod traits;

pub use terminal::TerminalConsole;
pub use traits::{Console, CriterionPurpose, FileStore, MemoryStore, MenuChoice, RecordStore};
