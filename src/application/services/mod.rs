//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (Console, RecordStore)
//! but are themselves concrete structs, not traits.

mod records;

pub use records::{RecordService, TreePolicy};
