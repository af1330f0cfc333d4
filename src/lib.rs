//! rectree: records kept in an ordered binary tree and persisted to a flat
//! binary stream.
//!
//! Layers, inner to outer:
//! - [`domain`]: the `Record` contract, the contact record, nodes and the tree
//! - [`application`]: the record service and the edit session
//! - [`infrastructure`]: terminal console and record stores
//! - [`cli`]: argument parsing, commands and the menu loop

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
