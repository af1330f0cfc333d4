//! Domain layer: record contract, contact record and the ordered tree
//!
//! This layer is independent of external concerns (no terminal, no config loading).
//! Byte streams come in as `Read`/`Write` trait objects.

pub mod contact;
pub mod display;
pub mod error;
pub mod node;
pub mod record;
pub mod tree;

pub use contact::{Contact, ContactField, ContactInput, ContactQuery, PhoneNumber};
pub use display::{TreeNodeConvert, MAX_VIEW_DEPTH};
pub use error::{DomainError, DomainResult};
pub use node::{Link, Node};
pub use record::{Criterion, Record, RenderMode};
pub use tree::{DeleteMode, RecordTree, Removal, FIRST_INDEX};
