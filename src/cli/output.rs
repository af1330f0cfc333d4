//! Colored terminal output for command results
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically. Menu mode
//! writes through the console instead.

use std::fmt::Display;

use colored::Colorize;

/// Red bold "error:" prefix, to stderr
pub fn error(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Yellow "Warning:" prefix, to stderr
pub fn warning(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Green checkmark
pub fn success(msg: &(impl Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Green label, e.g. a config location
pub fn action(label: &str, msg: &(impl Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

pub fn header(msg: &(impl Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Uncolored, for the tree view and config dumps
pub fn info(msg: &(impl Display + ?Sized)) {
    println!("{}", msg);
}

/// Cyan header line followed by plain rows.
pub fn table(header_line: &str, rows: &[String]) {
    header(header_line);
    for row in rows {
        info(row);
    }
}
