//! Guarded edit of a single record
//!
//! The session holds the saved value and a scratch copy. Field edits only
//! touch the scratch; `Save` hands the scratch back for commit, `Exit`
//! throws it away.

use tracing::{debug, instrument};

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::Record;
use crate::infrastructure::traits::Console;

/// Answer to the edit menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditChoice<F> {
    /// Commit the scratch value and end the session.
    Save,
    /// Discard the scratch value and end the session.
    Exit,
    /// Prompt for this field and update the scratch value.
    Field(F),
}

/// How an edit session on a stored record ended.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome<R> {
    Saved { index: u32, previous: R },
    Discarded,
}

#[derive(Debug, Clone)]
pub struct EditSession<R: Record> {
    saved: R,
    scratch: R,
}

impl<R: Record> EditSession<R> {
    pub fn new(saved: R) -> Self {
        let scratch = saved.clone();
        Self { saved, scratch }
    }

    pub fn saved(&self) -> &R {
        &self.saved
    }

    pub fn scratch(&self) -> &R {
        &self.scratch
    }

    pub fn apply(&mut self, input: R::Input) {
        self.scratch.set_field(input);
    }

    /// Whether the scratch would change the sort key on commit.
    pub fn key_changed(&self) -> bool {
        self.saved.sort_key() != self.scratch.sort_key()
    }

    pub fn commit(self) -> R {
        self.scratch
    }

    pub fn discard(self) -> R {
        self.saved
    }
}

/// Drives the edit menu until the user saves or exits.
///
/// Returns the value to commit, or `None` when the edit was discarded.
#[instrument(level = "debug", skip_all)]
pub fn run_edit<R, C>(console: &mut C, saved: R) -> ApplicationResult<Option<R>>
where
    R: Record,
    C: Console<R> + ?Sized,
{
    let mut session = EditSession::new(saved);
    loop {
        let choice = console
            .edit_choice(session.saved(), session.scratch())
            .console_err()?;
        match choice {
            EditChoice::Save => {
                debug!(key_changed = session.key_changed(), "edit saved");
                return Ok(Some(session.commit()));
            }
            EditChoice::Exit => {
                debug!("edit discarded");
                session.discard();
                return Ok(None);
            }
            EditChoice::Field(field) => {
                let input = console.prompt_field(field).console_err()?;
                session.apply(input);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Contact, ContactInput, PhoneNumber};

    fn doe() -> Contact {
        Contact::new("DOE", "JOHN", PhoneNumber::new(212, 555, 1234).unwrap())
    }

    #[test]
    fn scratch_starts_as_copy_of_saved() {
        let session = EditSession::new(doe());
        assert_eq!(session.saved(), session.scratch());
        assert!(!session.key_changed());
    }

    #[test]
    fn apply_touches_scratch_only() {
        let mut session = EditSession::new(doe());

        session.apply(ContactInput::LastName("ROE".into()));

        assert_eq!(session.saved().last_name(), "DOE");
        assert_eq!(session.scratch().last_name(), "ROE");
        assert!(session.key_changed());
    }

    #[test]
    fn commit_returns_scratch_and_discard_returns_saved() {
        let mut session = EditSession::new(doe());
        session.apply(ContactInput::FirstName("JANE".into()));
        assert_eq!(session.clone().commit().first_name(), "JANE");
        assert_eq!(session.discard().first_name(), "JOHN");
    }
}
