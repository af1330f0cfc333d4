//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueHint};

/// Contact records kept in an ordered binary tree, persisted to a flat binary file
#[derive(Parser, Debug)]
#[command(name = "rectree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level: -d info, -dd debug, -ddd trace
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Data file (overrides config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// Directory holding a local .rectree.toml
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive numeric menu (default)
    Menu,

    /// Add a contact
    Add {
        /// Last name
        last: String,
        /// First name
        first: String,
        /// Phone number: "xxx xxx xxxx", "(xxx) xxx-xxxx" or ten digits
        phone: String,
    },

    /// List all contacts (tree order)
    List {
        /// Ascending sort order instead of tree order
        #[arg(short, long)]
        sorted: bool,
    },

    /// Print contacts matching a criterion
    Find {
        #[command(flatten)]
        query: QueryArgs,
        /// Only the first match
        #[arg(long)]
        first_match: bool,
    },

    /// Delete the first contact matching a criterion
    Delete {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Show the tree structure
    Tree,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Exactly one criterion.
#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("criterion").required(true).multiple(false)))]
pub struct QueryArgs {
    /// Node index
    #[arg(long, group = "criterion")]
    pub index: Option<u32>,

    /// Last name
    #[arg(long, group = "criterion")]
    pub last: Option<String>,

    /// First name
    #[arg(long, group = "criterion")]
    pub first: Option<String>,

    /// Full phone number
    #[arg(long, group = "criterion")]
    pub phone: Option<String>,

    /// Area code
    #[arg(long, group = "criterion")]
    pub area: Option<String>,

    /// Nodes without children
    #[arg(long, group = "criterion")]
    pub leaves: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print a config template
    Template,

    /// Show config paths
    Path,
}
