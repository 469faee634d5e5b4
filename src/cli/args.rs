//! CLI argument definitions using clap.
//!
//! This module defines the command-line interface structure for all loctl
//! commands. It uses clap's derive API for declarative argument parsing.
//!
//! ## Commands
//!
//! - `list` / `set` / `rm`: inspect and edit translation keys
//! - `groups`: manage the group taxonomy
//! - `scan`: harvest missing keys from template sources
//! - `clean`: preview or delete keys no template references
//! - `export` / `import`: move translations through CSV, JSON or an
//!   archive tree
//! - `translate`: machine-translate values missing on a target site
//! - `init`: initialize the configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExchangeFormat {
    Csv,
    Json,
    Archive,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Case-insensitive key substring filter
    #[arg(long)]
    pub search: Option<String>,

    /// Only show keys from this group
    #[arg(long)]
    pub group: Option<String>,

    #[arg(long)]
    pub limit: Option<usize>,

    #[arg(long)]
    pub offset: Option<usize>,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    pub key: String,
    pub site_id: i64,
    /// New value; an empty string removes the stored value
    pub value: String,

    /// Move the key into this group (existing group is kept otherwise)
    #[arg(long)]
    pub group: Option<String>,
}

#[derive(Debug, Args)]
pub struct RmArgs {
    pub key: String,
}

#[derive(Debug, Args)]
pub struct GroupsCommand {
    #[command(subcommand)]
    pub action: Option<GroupsAction>,
}

#[derive(Debug, Subcommand)]
pub enum GroupsAction {
    /// List group names with their key counts
    List,
    /// Rename a group, merging into the target when it already exists
    Rename { old: String, new: String },
    /// Delete a group; its keys are reassigned to "site"
    Delete { name: String },
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Group assigned to newly discovered keys
    #[arg(long, default_value = "site")]
    pub group: String,
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Only consider keys from this group
    #[arg(long)]
    pub group: Option<String>,

    /// Actually delete keys (default is dry-run)
    #[arg(long)]
    pub apply: bool,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[arg(long, value_enum)]
    pub format: ExchangeFormat,

    /// Output file, or output directory for the archive format
    pub path: PathBuf,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    #[arg(long, value_enum)]
    pub format: ExchangeFormat,

    /// Input file, or directory holding a translations/ tree
    pub path: PathBuf,
}

#[derive(Debug, Args)]
pub struct TranslateArgs {
    /// Site supplying the source texts
    #[arg(long)]
    pub source_site: i64,

    /// Site whose missing values get filled
    #[arg(long)]
    pub target_site: i64,

    /// Send texts as HTML instead of plain text
    #[arg(long)]
    pub html: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List translation keys with their per-site values
    List(ListArgs),
    /// Create or update one key's value for one site
    Set(SetArgs),
    /// Delete a translation key and all of its values
    Rm(RmArgs),
    /// Inspect or edit the group taxonomy
    Groups(GroupsCommand),
    /// Harvest missing translation keys from the template sources
    Scan(ScanArgs),
    /// Remove keys no template references
    Clean(CleanArgs),
    /// Export translations to CSV, JSON or an archive tree
    Export(ExportArgs),
    /// Import translations from CSV, JSON or an archive tree
    Import(ImportArgs),
    /// Machine-translate values missing on a target site
    Translate(TranslateArgs),
    /// Initialize a new .loctlrc.json configuration file
    Init,
}
