//! Line-oriented console for contacts
//!
//! Works on any `BufRead`/`Write` pair so tests can drive it with byte
//! buffers. Invalid input re-issues the same prompt, with no retry bound.

use std::io::{self, BufRead, StdinLock, Stdout, Write};

use tracing::trace;

use crate::application::EditChoice;
use crate::domain::{
    contact::NAME_SIZE, Contact, ContactField, ContactInput, ContactQuery, Criterion,
    PhoneNumber, Record, RenderMode,
};
use crate::infrastructure::traits::{Console, CriterionPurpose, MenuChoice};

const MAIN_MENU: &[&str] = &[
    "1. Insert a new contact into the tree.",
    "2. Modify an existing contact in the tree.",
    "3. Delete an existing contact from the tree.",
    "4. Print a specific name and phone number (first occurrence).",
    "5. Print names and phone numbers (all fitting criteria).",
    "6. Print all names and phone numbers.",
    "0. Exit from program.",
];

const LOCATE_MENU: &[&str] = &[
    "1. Locate contact by index.",
    "2. Locate contact by last name.",
    "3. Locate contact by first name.",
    "4. Locate contact by phone number.",
    "5. Locate contact by area code.",
    "0. Exit (to Menu).",
];

const FILTER_MENU: &[&str] = &[
    "1. Print iff leaf.",
    "2. Locate contacts by last name.",
    "3. Locate contacts by first name.",
    "4. Locate contacts by phone number.",
    "5. Locate contacts by area code.",
    "0. Exit (to Menu).",
];

const EDIT_MENU: &[&str] = &[
    "1. Save contact.",
    "2. Edit contact last name.",
    "3. Edit contact first name.",
    "4. Edit contact phone number.",
    "0. Exit (to Menu).",
];

pub struct TerminalConsole<I, O> {
    input: I,
    output: O,
}

impl TerminalConsole<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<I: BufRead, O: Write> TerminalConsole<I, O> {
    pub fn new(input: I, output: O) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> O {
        self.output
    }

    /// Next input line without the line ending. `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        trace!(line = line.trim_end(), "console input");
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn require_line(&mut self) -> io::Result<String> {
        self.read_line()?.ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "input closed while prompting")
        })
    }

    fn print_lines(&mut self, lines: &[&str]) -> io::Result<()> {
        for line in lines {
            writeln!(self.output, "{line}")?;
        }
        Ok(())
    }

    /// Shows `title` and `entries`, then reads a number in `0..entries.len()`.
    ///
    /// Out-of-range or non-numeric input re-shows the menu with a notice.
    /// `None` at end of input.
    fn numbered_menu(&mut self, title: &[String], entries: &[&str]) -> io::Result<Option<usize>> {
        let mut rejected: Option<String> = None;
        loop {
            for line in title {
                writeln!(self.output, "{line}")?;
            }
            if let Some(input) = rejected.take() {
                writeln!(
                    self.output,
                    "   input '{input}' invalid; input must be among those listed."
                )?;
            }
            self.print_lines(entries)?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match line.trim().parse::<usize>() {
                Ok(choice) if choice < entries.len() => return Ok(Some(choice)),
                _ => rejected = Some(line.trim().to_string()),
            }
        }
    }

    /// Repeats `message` until `parse` accepts the answer.
    fn prompt_until<T>(
        &mut self,
        message: &str,
        invalid: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> io::Result<T> {
        loop {
            writeln!(self.output, "{message}")?;
            self.output.flush()?;
            let line = self.require_line()?;
            match parse(line.trim()) {
                Some(value) => return Ok(value),
                None => writeln!(self.output, "{invalid}")?,
            }
        }
    }

    fn prompt_name(&mut self, which: &str) -> io::Result<String> {
        let message = format!(
            "please enter (in {NAME_SIZE} characters or less) the contact's {which} name."
        );
        self.prompt_until(&message, "invalid input", |s| {
            (!s.is_empty()).then(|| s.to_string())
        })
    }

    fn prompt_phone(&mut self) -> io::Result<PhoneNumber> {
        self.prompt_until(
            "please enter contact's phone number in the format: xxx xxx xxxx.",
            "invalid phone number format",
            |s| s.parse().ok(),
        )
    }

    fn prompt_area(&mut self) -> io::Result<u16> {
        self.prompt_until(
            "please enter contact's area code: xxx.",
            "invalid area code format",
            |s| PhoneNumber::parse_area(s).ok(),
        )
    }

    fn prompt_index(&mut self) -> io::Result<u32> {
        self.prompt_until("please enter contact's index.", "invalid input", |s| {
            s.parse().ok()
        })
    }
}

impl<I: BufRead, O: Write> Console<Contact> for TerminalConsole<I, O> {
    fn main_menu(&mut self) -> io::Result<MenuChoice> {
        let title = vec!["WELCOME TO CONTACT TREE SET MENU!!".to_string(), String::new()];
        let choice = match self.numbered_menu(&title, MAIN_MENU)? {
            None => return Ok(MenuChoice::Exit),
            Some(choice) => choice,
        };
        Ok(match choice {
            1 => MenuChoice::Add,
            2 => MenuChoice::Modify,
            3 => MenuChoice::Delete,
            4 => MenuChoice::PrintOne,
            5 => MenuChoice::PrintByCriteria,
            6 => MenuChoice::PrintAll,
            _ => MenuChoice::Exit,
        })
    }

    fn choose_criterion(
        &mut self,
        purpose: CriterionPurpose,
    ) -> io::Result<Option<Criterion<ContactQuery>>> {
        let entries = match purpose {
            CriterionPurpose::Locate => LOCATE_MENU,
            CriterionPurpose::Filter => FILTER_MENU,
        };
        let Some(choice) = self.numbered_menu(&[], entries)? else {
            return Ok(None);
        };
        let criterion = match (choice, purpose) {
            (0, _) => return Ok(None),
            (1, CriterionPurpose::Locate) => Criterion::Index(self.prompt_index()?),
            (1, CriterionPurpose::Filter) => Criterion::Leaves,
            (2, _) => Criterion::Field(ContactQuery::last_name(&self.prompt_name("last")?)),
            (3, _) => Criterion::Field(ContactQuery::first_name(&self.prompt_name("first")?)),
            (4, _) => Criterion::Field(ContactQuery::PhoneNumber(self.prompt_phone()?)),
            _ => Criterion::Field(ContactQuery::AreaCode(self.prompt_area()?)),
        };
        Ok(Some(criterion))
    }

    fn prompt_field(&mut self, field: ContactField) -> io::Result<ContactInput> {
        Ok(match field {
            ContactField::FirstName => ContactInput::FirstName(self.prompt_name("first")?),
            ContactField::LastName => ContactInput::LastName(self.prompt_name("last")?),
            ContactField::PhoneNumber => ContactInput::PhoneNumber(self.prompt_phone()?),
        })
    }

    fn edit_choice(
        &mut self,
        saved: &Contact,
        scratch: &Contact,
    ) -> io::Result<EditChoice<ContactField>> {
        let title = vec![
            format!("saved contact:         {}", saved.render(RenderMode::Long)),
            format!("contact being edited:  {}", scratch.render(RenderMode::Long)),
        ];
        let Some(choice) = self.numbered_menu(&title, EDIT_MENU)? else {
            return Ok(EditChoice::Exit);
        };
        Ok(match choice {
            1 => EditChoice::Save,
            2 => EditChoice::Field(ContactField::LastName),
            3 => EditChoice::Field(ContactField::FirstName),
            4 => EditChoice::Field(ContactField::PhoneNumber),
            _ => EditChoice::Exit,
        })
    }

    fn show(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{line}")
    }
}
