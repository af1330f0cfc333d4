//! I/O boundary traits for testability
//!
//! These traits abstract the terminal and the backing stream, allowing
//! services to be tested with mock implementations.

use std::fs::File;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::application::EditChoice;
use crate::domain::{Criterion, Record};

/// Entries of the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// Save the tree and leave.
    Exit,
    Add,
    Modify,
    Delete,
    /// First match of a locate criterion.
    PrintOne,
    /// Every match of a filter criterion.
    PrintByCriteria,
    PrintAll,
}

/// Which criterion menu to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriterionPurpose {
    /// Single record: modify, delete, print one. Offers lookup by index.
    Locate,
    /// Listing: offers the leaves-only filter instead of the index.
    Filter,
}

/// Interactive menus and prompts for one record type.
pub trait Console<R: Record> {
    /// Shows the main menu until a valid entry is chosen.
    /// End of input counts as [`MenuChoice::Exit`].
    fn main_menu(&mut self) -> io::Result<MenuChoice>;

    /// Asks for a criterion and its target value. `None` goes back to the menu.
    fn choose_criterion(
        &mut self,
        purpose: CriterionPurpose,
    ) -> io::Result<Option<Criterion<R::Query>>>;

    /// Reads a valid value for one field.
    fn prompt_field(&mut self, field: R::Field) -> io::Result<R::Input>;

    /// Shows saved and scratch values side by side and reads the next step.
    fn edit_choice(&mut self, saved: &R, scratch: &R) -> io::Result<EditChoice<R::Field>>;

    /// Writes one line of output.
    fn show(&mut self, line: &str) -> io::Result<()>;
}

/// Backing stream of a record tree.
pub trait RecordStore {
    /// Human readable location, for messages.
    fn describe(&self) -> String;

    /// Opens the stored records for reading. `None` when nothing was stored yet.
    fn reader(&self) -> io::Result<Option<Box<dyn Read>>>;

    /// Replaces the stored records with `bytes`.
    fn replace(&mut self, bytes: &[u8]) -> io::Result<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Records kept in a file on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent(&self) -> io::Result<&Path> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                std::fs::create_dir_all(parent)?;
                Ok(parent)
            }
            _ => Ok(Path::new(".")),
        }
    }
}

impl RecordStore for FileStore {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn reader(&self) -> io::Result<Option<Box<dyn Read>>> {
        match File::open(&self.path) {
            Ok(file) => Ok(Some(Box::new(io::BufReader::new(file)))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no data file at {}", self.path.display());
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Writes to a temp file next to the target and renames it into place.
    fn replace(&mut self, bytes: &[u8]) -> io::Result<()> {
        let dir = self.ensure_parent()?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        debug!("wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }
}

/// Records kept in memory. `None` until the first replace.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    bytes: Option<Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes: Some(bytes) }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }
}

impl RecordStore for MemoryStore {
    fn describe(&self) -> String {
        "<memory>".to_string()
    }

    fn reader(&self) -> io::Result<Option<Box<dyn Read>>> {
        Ok(self
            .bytes
            .clone()
            .map(|bytes| Box::new(Cursor::new(bytes)) as Box<dyn Read>))
    }

    fn replace(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.bytes = Some(bytes.to_vec());
        Ok(())
    }
}
