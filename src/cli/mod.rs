//! Command-line interface.
//!
//! A thin layer over [`AdminRepository`]: every command opens the working
//! tree, performs one operation, and reports the outcome.

pub mod keys;
pub mod output;
pub mod sync;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

use crate::core::admin::AdminRepository;
use crate::core::config::Settings;
use crate::error::Result;

/// keydir-admin - manage a gitolite-style admin repository.
#[derive(Parser)]
#[command(
    name = "keydir-admin",
    about = "Manage SSH keys and configuration in a gitolite admin repository",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Admin working tree (cloned when missing)
    #[arg(short = 'C', long, global = true, default_value = ".")]
    pub repo: PathBuf,

    /// Settings file (TOML)
    #[arg(long, global = true, env = "KEYDIR_ADMIN_SETTINGS")]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Format of diagnostic log lines on stderr.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// List keys
    Keys,

    /// Add a key from a public key file and commit it
    Add {
        /// Owner of the key
        owner: String,
        /// Public key file
        file: PathBuf,
        /// Location (e.g. desktop, server1)
        #[arg(short, long)]
        location: Option<String>,
        /// Subfolder, repeat for nesting
        #[arg(short, long = "subfolder")]
        subfolders: Vec<String>,
        /// Push after committing
        #[arg(long)]
        push: bool,
    },

    /// Remove a key and commit the removal
    Rm {
        /// Owner of the key
        owner: String,
        /// Location of the key
        #[arg(short, long)]
        location: Option<String>,
        /// Subfolder, repeat for nesting
        #[arg(short, long = "subfolder")]
        subfolders: Vec<String>,
        /// Push after committing
        #[arg(long)]
        push: bool,
    },

    /// Commit pending changes (e.g. edits to conf/gitolite.conf)
    Save {
        /// Commit message
        #[arg(short, long)]
        message: Option<String>,
        /// Push after committing
        #[arg(long)]
        push: bool,
    },

    /// Push the local branch to the remote
    Push,

    /// Fetch and merge remote changes
    Update,
}

/// Execute a command.
pub fn execute(cli: Cli) -> Result<()> {
    use Command::*;

    let settings = match &cli.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let repo = cli.repo.as_path();

    match cli.command {
        Keys => keys::list(repo, settings),
        Add {
            owner,
            file,
            location,
            subfolders,
            push,
        } => keys::add(repo, settings, &owner, &file, location, subfolders, push),
        Rm {
            owner,
            location,
            subfolders,
            push,
        } => keys::rm(repo, settings, &owner, location, subfolders, push),
        Save { message, push } => sync::save(repo, settings, message.as_deref(), push),
        Push => sync::push(repo, settings),
        Update => sync::update(repo, settings),
    }
}

/// Open the admin repository for a command.
pub(crate) fn open(repo: &Path, settings: Settings) -> Result<AdminRepository> {
    AdminRepository::open(repo, settings)
}
