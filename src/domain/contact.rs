//! Contact record: name/phone instantiation of [`Record`].
//!
//! On-stream layout (48 bytes, little endian):
//! ```text
//! ┌──────────────────┬─────────────────┬──────────┬────────────┬──────────┐
//! │ first name (21B) │ last name (21B) │ area(2B) │ prefix(2B) │ line(2B) │
//! └──────────────────┴─────────────────┴──────────┴────────────┴──────────┘
//! ```
//! Names are UTF-8, NUL padded. The sort key is not stored.

use std::cmp::Ordering;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::record::{Record, RenderMode};

/// Maximum stored name length in bytes.
pub const NAME_SIZE: usize = 20;

const NAME_FIELD_SIZE: usize = NAME_SIZE + 1;
const PHONE_OFFSET: usize = 2 * NAME_FIELD_SIZE;
const ENCODED_LEN: usize = PHONE_OFFSET + 3 * 2;

/// Width of a name column in short rendering.
const CELL_WIDTH: usize = 10;

/// Marker appended to text that was cut short.
const TRUNCATED: char = '+';

/// Area code, prefix and line number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhoneNumber {
    area: u16,
    prefix: u16,
    line: u16,
}

impl PhoneNumber {
    pub const MAX_AREA: u16 = 999;
    pub const MAX_PREFIX: u16 = 999;
    pub const MAX_LINE: u16 = 9999;

    pub fn new(area: u16, prefix: u16, line: u16) -> DomainResult<Self> {
        if area > Self::MAX_AREA {
            return Err(DomainError::invalid(
                "phone number",
                format!("area code {area} has more than 3 digits"),
            ));
        }
        if prefix > Self::MAX_PREFIX {
            return Err(DomainError::invalid(
                "phone number",
                format!("prefix {prefix} has more than 3 digits"),
            ));
        }
        if line > Self::MAX_LINE {
            return Err(DomainError::invalid(
                "phone number",
                format!("line number {line} has more than 4 digits"),
            ));
        }
        Ok(Self { area, prefix, line })
    }

    pub fn area(&self) -> u16 {
        self.area
    }

    pub fn prefix(&self) -> u16 {
        self.prefix
    }

    pub fn line(&self) -> u16 {
        self.line
    }

    /// Parses a bare area code (`xxx`).
    pub fn parse_area(s: &str) -> DomainResult<u16> {
        let area = parse_group(s.trim(), "area code")?;
        if area > Self::MAX_AREA {
            return Err(DomainError::invalid(
                "area code",
                format!("{area} has more than 3 digits"),
            ));
        }
        Ok(area)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:03}) {:03}-{:04}", self.area, self.prefix, self.line)
    }
}

/// Accepts `xxx xxx xxxx`, `(xxx) xxx-xxxx` or ten contiguous digits.
impl FromStr for PhoneNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let groups: Vec<&str> = s
            .split(|c: char| !c.is_ascii_digit())
            .filter(|group| !group.is_empty())
            .collect();
        match groups.as_slice() {
            [area, prefix, line] => Self::new(
                parse_group(area, "phone number")?,
                parse_group(prefix, "phone number")?,
                parse_group(line, "phone number")?,
            ),
            [digits] if digits.len() == 10 => Self::new(
                parse_group(&digits[..3], "phone number")?,
                parse_group(&digits[3..6], "phone number")?,
                parse_group(&digits[6..], "phone number")?,
            ),
            _ => Err(DomainError::invalid(
                "phone number",
                format!("'{}' is not in the format xxx xxx xxxx", s.trim()),
            )),
        }
    }
}

fn parse_group(group: &str, field: &'static str) -> DomainResult<u16> {
    group
        .parse::<u16>()
        .map_err(|e| DomainError::invalid(field, format!("'{group}': {e}")))
}

/// Editable contact fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    LastName,
    FirstName,
    PhoneNumber,
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactField::LastName => write!(f, "last name"),
            ContactField::FirstName => write!(f, "first name"),
            ContactField::PhoneNumber => write!(f, "phone number"),
        }
    }
}

/// New value for one [`ContactField`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactInput {
    LastName(String),
    FirstName(String),
    PhoneNumber(PhoneNumber),
}

/// Field-level search targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactQuery {
    LastName(String),
    FirstName(String),
    PhoneNumber(PhoneNumber),
    /// Matches every number with this area code.
    AreaCode(u16),
}

impl ContactQuery {
    /// Last-name query, trimmed and cut like a stored name.
    pub fn last_name(name: &str) -> Self {
        Self::LastName(fit_name(name))
    }

    /// First-name query, trimmed and cut like a stored name.
    pub fn first_name(name: &str) -> Self {
        Self::FirstName(fit_name(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    first_name: String,
    last_name: String,
    phone: PhoneNumber,
    key: String,
}

impl Contact {
    pub fn new(last_name: &str, first_name: &str, phone: PhoneNumber) -> Self {
        let mut contact = Self {
            first_name: fit_name(first_name),
            last_name: fit_name(last_name),
            phone,
            key: String::new(),
        };
        contact.regenerate_key();
        contact
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn phone(&self) -> PhoneNumber {
        self.phone
    }

    pub fn set_first_name(&mut self, name: &str) {
        self.first_name = fit_name(name);
        self.regenerate_key();
    }

    pub fn set_last_name(&mut self, name: &str) {
        self.last_name = fit_name(name);
        self.regenerate_key();
    }

    pub fn set_phone(&mut self, phone: PhoneNumber) {
        self.phone = phone;
        self.regenerate_key();
    }

    fn regenerate_key(&mut self) {
        self.key = format!(
            "{}{}{:03}{:03}{:04}",
            self.last_name, self.first_name, self.phone.area, self.phone.prefix, self.phone.line
        );
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(RenderMode::Long))
    }
}

impl Record for Contact {
    type Query = ContactQuery;
    type Field = ContactField;
    type Input = ContactInput;

    const FIELDS: &'static [ContactField] = &[
        ContactField::FirstName,
        ContactField::LastName,
        ContactField::PhoneNumber,
    ];

    const ENCODED_SIZE: usize = ENCODED_LEN;

    fn blank() -> Self {
        Self::new("", "", PhoneNumber::default())
    }

    fn sort_key(&self) -> &str {
        &self.key
    }

    fn encode(&self, out: &mut dyn Write) -> io::Result<()> {
        let mut buf = [0u8; ENCODED_LEN];
        encode_name(&mut buf[..NAME_FIELD_SIZE], &self.first_name);
        encode_name(&mut buf[NAME_FIELD_SIZE..PHONE_OFFSET], &self.last_name);
        buf[PHONE_OFFSET..PHONE_OFFSET + 2].copy_from_slice(&self.phone.area.to_le_bytes());
        buf[PHONE_OFFSET + 2..PHONE_OFFSET + 4].copy_from_slice(&self.phone.prefix.to_le_bytes());
        buf[PHONE_OFFSET + 4..ENCODED_LEN].copy_from_slice(&self.phone.line.to_le_bytes());
        out.write_all(&buf)
    }

    fn decode(buf: &[u8]) -> DomainResult<Self> {
        if buf.len() != ENCODED_LEN {
            return Err(DomainError::invalid(
                "record",
                format!("expected {} bytes, got {}", ENCODED_LEN, buf.len()),
            ));
        }
        let first_name = decode_name(&buf[..NAME_FIELD_SIZE], "first name")?;
        let last_name = decode_name(&buf[NAME_FIELD_SIZE..PHONE_OFFSET], "last name")?;
        let word = |at: usize| u16::from_le_bytes([buf[at], buf[at + 1]]);
        let phone = PhoneNumber::new(
            word(PHONE_OFFSET),
            word(PHONE_OFFSET + 2),
            word(PHONE_OFFSET + 4),
        )?;
        Ok(Self::new(&last_name, &first_name, phone))
    }

    fn find_cmp(&self, query: &ContactQuery) -> Ordering {
        match query {
            ContactQuery::LastName(name) => self.last_name.as_str().cmp(name.as_str()),
            ContactQuery::FirstName(name) => self.first_name.as_str().cmp(name.as_str()),
            ContactQuery::PhoneNumber(phone) => self.phone.cmp(phone),
            ContactQuery::AreaCode(area) => self.phone.area.cmp(area),
        }
    }

    fn set_field(&mut self, input: ContactInput) {
        match input {
            ContactInput::LastName(name) => self.set_last_name(&name),
            ContactInput::FirstName(name) => self.set_first_name(&name),
            ContactInput::PhoneNumber(phone) => self.set_phone(phone),
        }
    }

    fn render(&self, mode: RenderMode) -> String {
        match mode {
            RenderMode::Short => format!(
                "{}     {}     {}",
                cell(&self.last_name),
                cell(&self.first_name),
                self.phone
            ),
            RenderMode::Long => format!(
                "{}     {}     {}",
                self.last_name, self.first_name, self.phone
            ),
        }
    }

    fn table_header() -> String {
        format!(
            "{:>width$}     {:>width$}     {}",
            "Last Name",
            "First Name",
            "Phone Number",
            width = CELL_WIDTH
        )
    }
}

/// Trims, drops NULs and cuts to `NAME_SIZE` bytes, marking a cut with `+`.
fn fit_name(name: &str) -> String {
    let name: String = name.trim().chars().filter(|c| *c != '\0').collect();
    if name.len() <= NAME_SIZE {
        return name;
    }
    let mut cut = NAME_SIZE - TRUNCATED.len_utf8();
    while !name.is_char_boundary(cut) {
        cut -= 1;
    }
    let mut fitted = name[..cut].to_string();
    fitted.push(TRUNCATED);
    fitted
}

/// Right-aligned table cell, cut with `+` when wider than the column.
fn cell(name: &str) -> String {
    if name.chars().count() > CELL_WIDTH {
        let mut cut: String = name.chars().take(CELL_WIDTH - 1).collect();
        cut.push(TRUNCATED);
        cut
    } else {
        format!("{:>width$}", name, width = CELL_WIDTH)
    }
}

fn encode_name(dest: &mut [u8], name: &str) {
    let bytes = name.as_bytes();
    let len = bytes.len().min(NAME_SIZE);
    dest[..len].copy_from_slice(&bytes[..len]);
}

fn decode_name(field: &[u8], label: &'static str) -> DomainResult<String> {
    let end = field
        .iter()
        .position(|b| *b == 0)
        .ok_or_else(|| DomainError::invalid(label, "missing NUL terminator"))?;
    std::str::from_utf8(&field[..end])
        .map(str::to_owned)
        .map_err(|e| DomainError::invalid(label, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn phone(area: u16, prefix: u16, line: u16) -> PhoneNumber {
        PhoneNumber::new(area, prefix, line).unwrap()
    }

    #[test]
    fn sort_key_is_last_first_then_padded_number() {
        let contact = Contact::new("SMITH", "JOHN", phone(0, 555, 1234));
        assert_eq!(contact.sort_key(), "SMITHJOHN0005551234");

        let contact = Contact::new("DOE", "JOHN", phone(212, 555, 1));
        assert_eq!(contact.sort_key(), "DOEJOHN2125550001");
    }

    #[test]
    fn setting_a_field_regenerates_the_key() {
        let mut contact = Contact::new("SMITH", "JOHN", phone(0, 555, 1234));
        contact.set_field(ContactInput::FirstName("JANE".into()));
        assert_eq!(contact.sort_key(), "SMITHJANE0005551234");
        contact.set_field(ContactInput::PhoneNumber(phone(212, 555, 9999)));
        assert_eq!(contact.sort_key(), "SMITHJANE2125559999");
    }

    #[test]
    fn long_names_are_cut_with_marker() {
        let contact = Contact::new("ABCDEFGHIJKLMNOPQRSTUVWXYZ", "Al", phone(1, 2, 3));
        assert_eq!(contact.last_name(), "ABCDEFGHIJKLMNOPQRS+");
        assert_eq!(contact.last_name().len(), NAME_SIZE);
    }

    #[rstest]
    #[case("ABCDEFGHIJKLMNOPQRSTUVWXYZ")]
    #[case("  SMITH  ")]
    #[case("ÄÄÄÄÄÄÄÄÄÄÄÄ")]
    fn name_query_matches_name_as_entered(#[case] entered: &str) {
        let contact = Contact::new(entered, entered, phone(1, 2, 3));

        assert_eq!(
            contact.find_cmp(&ContactQuery::last_name(entered)),
            Ordering::Equal
        );
        assert_eq!(
            contact.find_cmp(&ContactQuery::first_name(entered)),
            Ordering::Equal
        );
    }

    #[test]
    fn multibyte_names_are_cut_on_char_boundary() {
        let contact = Contact::new("ÄÄÄÄÄÄÄÄÄÄÄÄ", "x", phone(1, 2, 3));
        assert!(contact.last_name().ends_with('+'));
        assert!(contact.last_name().len() <= NAME_SIZE);
    }

    #[test]
    fn encoded_record_has_fixed_size_and_no_key() {
        let contact = Contact::new("SMITH", "JOHN", phone(0, 555, 1234));
        let mut buf = Vec::new();
        contact.encode(&mut buf).unwrap();

        assert_eq!(buf.len(), Contact::ENCODED_SIZE);
        assert_eq!(&buf[..4], b"JOHN");
        assert_eq!(&buf[21..26], b"SMITH");
        assert_eq!(&buf[42..44], &0u16.to_le_bytes());
        assert_eq!(&buf[44..46], &555u16.to_le_bytes());
        assert_eq!(&buf[46..48], &1234u16.to_le_bytes());

        let decoded = Contact::decode(&buf).unwrap();
        assert_eq!(decoded, contact);
        assert_eq!(decoded.sort_key(), "SMITHJOHN0005551234");
    }

    #[test]
    fn decode_rejects_out_of_range_phone() {
        let mut buf = Vec::new();
        Contact::new("A", "B", phone(1, 2, 3)).encode(&mut buf).unwrap();
        buf[46..48].copy_from_slice(&10_000u16.to_le_bytes());

        let err = Contact::decode(&buf).unwrap_err();
        assert!(err.to_string().contains("line number"));
    }

    #[test]
    fn decode_rejects_unterminated_name() {
        let mut buf = vec![b'A'; Contact::ENCODED_SIZE];
        buf[42..].fill(0);
        assert!(Contact::decode(&buf).is_err());
    }

    #[rstest]
    #[case("212 555 0001", (212, 555, 1))]
    #[case("(212) 555-0001", (212, 555, 1))]
    #[case("2125550001", (212, 555, 1))]
    #[case("0 0 0", (0, 0, 0))]
    fn phone_parses_accepted_formats(#[case] input: &str, #[case] expected: (u16, u16, u16)) {
        let parsed: PhoneNumber = input.parse().unwrap();
        assert_eq!(parsed, phone(expected.0, expected.1, expected.2));
    }

    #[rstest]
    #[case("1000 555 0001")]
    #[case("212 5555 0001")]
    #[case("212 555 10000")]
    #[case("212 555")]
    #[case("not a number")]
    fn phone_rejects_invalid_input(#[case] input: &str) {
        assert!(input.parse::<PhoneNumber>().is_err());
    }

    #[test]
    fn phone_display_is_zero_padded() {
        assert_eq!(phone(12, 5, 7).to_string(), "(012) 005-0007");
    }

    #[test]
    fn short_render_right_aligns_and_marks_cut_cells() {
        let contact = Contact::new("Smith", "Bartholomew", phone(212, 555, 1));
        assert_eq!(
            contact.render(RenderMode::Short),
            "     Smith     Bartholom+     (212) 555-0001"
        );
    }

    #[test]
    fn long_render_keeps_full_names() {
        let contact = Contact::new("Smith", "Bartholomew", phone(212, 555, 1));
        assert_eq!(
            contact.render(RenderMode::Long),
            "Smith     Bartholomew     (212) 555-0001"
        );
    }

    #[test]
    fn header_lines_up_with_short_rows() {
        assert_eq!(
            Contact::table_header(),
            " Last Name     First Name     Phone Number"
        );
    }

    #[test]
    fn find_cmp_matches_area_code_regardless_of_rest() {
        let contact = Contact::new("A", "B", phone(212, 555, 1));
        assert_eq!(contact.find_cmp(&ContactQuery::AreaCode(212)), Ordering::Equal);
        assert_ne!(contact.find_cmp(&ContactQuery::AreaCode(213)), Ordering::Equal);
        assert_eq!(
            contact.find_cmp(&ContactQuery::PhoneNumber(phone(212, 555, 1))),
            Ordering::Equal
        );
    }
}
