//! The capability set a value type supplies to be stored in a [`RecordTree`].
//!
//! The tree never looks inside a value: ordering, matching, persistence and
//! rendering all go through this trait.
//!
//! [`RecordTree`]: crate::domain::RecordTree

use std::cmp::Ordering;
use std::fmt;
use std::io::{self, Read, Write};

use tracing::warn;

use crate::domain::error::{DomainError, DomainResult};

/// How much of a record `render` should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Fixed-width columns for table rows.
    Short,
    /// Untruncated values.
    Long,
}

/// Selector for find and print traversals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion<Q> {
    /// The node with this identity index.
    Index(u32),
    /// Nodes whose two child slots are empty.
    Leaves,
    /// Delegated to [`Record::find_cmp`].
    Field(Q),
}

/// Value contract for tree elements.
///
/// Construction from user input is `blank()` followed by one `set_field`
/// per entry of `FIELDS`; destruction is `Drop`.
pub trait Record: Clone + fmt::Debug {
    /// Field-level search target (e.g. "last name equals X").
    type Query: fmt::Debug;
    /// Editable field selector.
    type Field: Copy + fmt::Debug + PartialEq + Eq + 'static;
    /// New value for one field.
    type Input: fmt::Debug;

    /// Fields in prompt order when building a record from scratch.
    const FIELDS: &'static [Self::Field];

    /// Size in bytes of one encoded record on the backing stream.
    const ENCODED_SIZE: usize;

    /// Empty record with a freshly derived sort key.
    fn blank() -> Self;

    /// Derived sort key, regenerated whenever a field changes.
    fn sort_key(&self) -> &str;

    /// Writes exactly `ENCODED_SIZE` bytes.
    fn encode(&self, out: &mut dyn Write) -> io::Result<()>;

    /// Decodes one record from exactly `ENCODED_SIZE` bytes.
    fn decode(buf: &[u8]) -> DomainResult<Self>;

    /// `Equal` exactly when the record matches `query`.
    fn find_cmp(&self, query: &Self::Query) -> Ordering;

    /// Total order consistent with the sort key.
    fn sort_cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(other.sort_key())
    }

    fn set_field(&mut self, input: Self::Input);

    fn render(&self, mode: RenderMode) -> String;

    fn table_header() -> String;

    /// Reads the next record from `input`.
    ///
    /// Returns `Ok(None)` at end-of-stream. A trailing partial record is
    /// treated as end-of-stream and dropped.
    fn read_from(input: &mut dyn Read) -> DomainResult<Option<Self>> {
        let mut buf = vec![0u8; Self::ENCODED_SIZE];
        let filled = fill(input, &mut buf)?;
        if filled == 0 {
            return Ok(None);
        }
        if filled < buf.len() {
            warn!(
                "discarding truncated trailing record ({} of {} bytes)",
                filled,
                buf.len()
            );
            return Ok(None);
        }
        Self::decode(&buf).map(Some)
    }
}

/// Reads until `buf` is full or the stream ends, returning the byte count.
fn fill(input: &mut dyn Read, buf: &mut [u8]) -> DomainResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(DomainError::Io(e)),
        }
    }
    Ok(filled)
}
