//! Numeric menu loop
//!
//! Runs until the user picks exit or input ends, then saves the tree.
//! A miss shows a notice and returns to the menu.

use tracing::{debug, instrument};

use crate::application::services::RecordService;
use crate::application::{ApplicationError, ApplicationResult, EditOutcome, IoResultExt};
use crate::domain::{Criterion, Record};
use crate::infrastructure::traits::{Console, CriterionPurpose, MenuChoice, RecordStore};

/// Asks for a criterion and runs `op` with it. `None` when the user backs out.
fn with_criterion<R, C, S, T>(
    service: &mut RecordService<R, C, S>,
    purpose: CriterionPurpose,
    op: impl FnOnce(&mut RecordService<R, C, S>, &Criterion<R::Query>) -> ApplicationResult<T>,
) -> ApplicationResult<Option<T>>
where
    R: Record,
    C: Console<R>,
    S: RecordStore,
{
    match service.console_mut().choose_criterion(purpose).console_err()? {
        Some(criterion) => op(service, &criterion).map(Some),
        None => Ok(None),
    }
}

/// One menu action. Returns an optional notice for the user.
fn dispatch<R, C, S>(
    service: &mut RecordService<R, C, S>,
    choice: MenuChoice,
) -> ApplicationResult<Option<String>>
where
    R: Record,
    C: Console<R>,
    S: RecordStore,
{
    match choice {
        MenuChoice::Exit => Ok(None),
        MenuChoice::Add => service
            .add_interactive()
            .map(|index| Some(format!("record #{index} added"))),
        MenuChoice::Modify => {
            let outcome = with_criterion(service, CriterionPurpose::Locate, |s, c| s.modify(c))?;
            Ok(outcome.map(|outcome| match outcome {
                EditOutcome::Saved { index, .. } => format!("record #{index} saved"),
                EditOutcome::Discarded => "edit discarded".to_string(),
            }))
        }
        MenuChoice::Delete => {
            let removal = with_criterion(service, CriterionPurpose::Locate, |s, c| s.delete(c))?;
            Ok(removal.map(|r| {
                format!("record #{} deleted ({} node(s) released)", r.index, r.released)
            }))
        }
        MenuChoice::PrintOne => {
            with_criterion(service, CriterionPurpose::Locate, |s, c| s.print_first(c))?;
            Ok(None)
        }
        MenuChoice::PrintByCriteria => {
            let listed =
                with_criterion(service, CriterionPurpose::Filter, |s, c| s.print(Some(c)))?;
            Ok(listed.map(|n| format!("{n} record(s) listed")))
        }
        MenuChoice::PrintAll => service
            .print(None)
            .map(|n| Some(format!("{n} record(s) listed"))),
    }
}

/// Runs the menu and saves on exit. Returns the number of records saved.
#[instrument(level = "debug", skip_all)]
pub fn run_menu<R, C, S>(service: &mut RecordService<R, C, S>) -> ApplicationResult<usize>
where
    R: Record,
    C: Console<R>,
    S: RecordStore,
{
    loop {
        let choice = service.console_mut().main_menu().console_err()?;
        debug!(?choice, "menu");
        if choice == MenuChoice::Exit {
            break;
        }
        match dispatch(service, choice) {
            Ok(Some(notice)) => service.console_mut().show(&notice).console_err()?,
            Ok(None) => {}
            Err(e) if e.is_end_of_input() => {
                debug!("input closed, leaving menu");
                break;
            }
            Err(ApplicationError::NotFound(_)) => service
                .console_mut()
                .show("no matching record found")
                .console_err()?,
            Err(e) => return Err(e),
        }
    }
    service.save()
}
