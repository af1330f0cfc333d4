//! Command dispatch
//!
//! Every command loads settings, opens the data file, runs, and saves when
//! it changed something.

use std::io;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{RecordService, TreePolicy};
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands, QueryArgs};
use crate::cli::menu::run_menu;
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{Contact, ContactQuery, Criterion, PhoneNumber};
use crate::infrastructure::{FileStore, TerminalConsole};

type StdioConsole = TerminalConsole<io::StdinLock<'static>, io::Stdout>;
type ContactService = RecordService<Contact, StdioConsole, FileStore>;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Some(Commands::Config { command }) => cmd_config(cli, command),
        None | Some(Commands::Menu) => cmd_menu(&load_settings(cli)?),
        Some(Commands::Add { last, first, phone }) => {
            cmd_add(&load_settings(cli)?, last, first, phone)
        }
        Some(Commands::List { sorted }) => cmd_list(&load_settings(cli)?, *sorted),
        Some(Commands::Find { query, first_match }) => {
            cmd_find(&load_settings(cli)?, query, *first_match)
        }
        Some(Commands::Delete { query }) => cmd_delete(&load_settings(cli)?, query),
        Some(Commands::Tree) => cmd_tree(&load_settings(cli)?),
    }
}

/// Layered settings with the `--file` flag on top.
pub fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let settings = Settings::load(cli.config_dir.as_deref())?;
    let settings = match &cli.file {
        Some(file) => settings.with_data_file(file.clone()),
        None => settings,
    };
    debug!(?settings, "settings");
    Ok(settings)
}

/// Maps the exclusive query flags onto a criterion.
pub fn criterion_from_args(query: &QueryArgs) -> CliResult<Criterion<ContactQuery>> {
    let invalid = |e: crate::domain::DomainError| CliError::InvalidArgs(e.to_string());
    if let Some(index) = query.index {
        return Ok(Criterion::Index(index));
    }
    if let Some(last) = &query.last {
        return Ok(Criterion::Field(ContactQuery::last_name(last)));
    }
    if let Some(first) = &query.first {
        return Ok(Criterion::Field(ContactQuery::first_name(first)));
    }
    if let Some(phone) = &query.phone {
        let phone = phone.parse::<PhoneNumber>().map_err(invalid)?;
        return Ok(Criterion::Field(ContactQuery::PhoneNumber(phone)));
    }
    if let Some(area) = &query.area {
        let area = PhoneNumber::parse_area(area).map_err(invalid)?;
        return Ok(Criterion::Field(ContactQuery::AreaCode(area)));
    }
    if query.leaves {
        return Ok(Criterion::Leaves);
    }
    Err(CliError::InvalidArgs("one criterion is required".into()))
}

/// Builds a contact from command line values.
pub fn contact_from_args(last: &str, first: &str, phone: &str) -> CliResult<Contact> {
    if last.trim().is_empty() || first.trim().is_empty() {
        return Err(CliError::InvalidArgs("names must not be empty".into()));
    }
    let phone = phone
        .parse::<PhoneNumber>()
        .map_err(|e| CliError::InvalidArgs(e.to_string()))?;
    Ok(Contact::new(last, first, phone))
}

fn open_service(settings: &Settings) -> CliResult<ContactService> {
    let store = FileStore::new(&settings.data_file);
    Ok(RecordService::open(
        store,
        TerminalConsole::stdio(),
        TreePolicy::from(settings),
    )?)
}

#[instrument(skip_all)]
fn cmd_menu(settings: &Settings) -> CliResult<()> {
    let mut service = open_service(settings)?;
    let saved = run_menu(&mut service)?;
    output::success(&format!(
        "{} contact(s) saved to {}",
        saved,
        settings.data_file.display()
    ));
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_add(settings: &Settings, last: &str, first: &str, phone: &str) -> CliResult<()> {
    let contact = contact_from_args(last, first, phone)?;
    let mut service = open_service(settings)?;
    let index = service.add(contact.clone());
    service.save()?;
    output::success(&format!("added #{index}: {contact}"));
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_list(settings: &Settings, sorted: bool) -> CliResult<()> {
    let mut service = open_service(settings)?;
    if sorted {
        output::table(&service.header(), &service.sorted_rows());
    } else {
        service.print(None)?;
    }
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_find(settings: &Settings, query: &QueryArgs, first_match: bool) -> CliResult<()> {
    let criterion = criterion_from_args(query)?;
    let mut service = open_service(settings)?;
    if first_match {
        service.print_first(&criterion)?;
        return Ok(());
    }
    if service.find_all(&criterion).is_empty() {
        output::warning("no matching contact found");
        return Err(ApplicationError::NotFound(format!("{criterion:?}")).into());
    }
    service.print(Some(&criterion))?;
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_delete(settings: &Settings, query: &QueryArgs) -> CliResult<()> {
    let criterion = criterion_from_args(query)?;
    let mut service = open_service(settings)?;
    let removal = service.delete(&criterion)?;
    service.save()?;
    output::success(&format!("deleted #{}: {}", removal.index, removal.value));
    if removal.released > 1 {
        output::warning(&format!(
            "{} descendant record(s) removed with it",
            removal.released - 1
        ));
    }
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_tree(settings: &Settings) -> CliResult<()> {
    let service = open_service(settings)?;
    output::info(&service.display_tree());
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::warning("no global config directory on this platform"),
            }
            if let Some(dir) = &cli.config_dir {
                output::action("local", &local_config_path(dir).display());
            }
        }
    }
    Ok(())
}
