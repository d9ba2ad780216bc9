//! Command-line interface for sitracker
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::issue::Status;

mod init;
mod issue;

/// sitracker - issue tracking in a spreadsheet
///
/// Keeps issues as rows of one sheet: a local JSON workbook by default,
/// or a Google Sheets spreadsheet.
#[derive(Parser, Debug)]
#[command(name = "sitracker")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file (defaults to ./.sitracker.toml)
    #[arg(long, global = true, env = "SITRACKER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default config and the sheet header
    Init,

    /// Create a new OPEN issue
    Create {
        /// What needs doing
        #[arg(short, long)]
        description: String,

        /// Id of the parent issue
        #[arg(short, long)]
        parent_id: Option<String>,
    },

    /// Change the status of an issue
    Update {
        /// Issue id (e.g. AD-1)
        id: String,

        /// New status: OPEN, IN_PROGRESS, CLOSED
        #[arg(short, long)]
        status: Status,
    },

    /// List issues, optionally filtered by status
    List {
        /// Only issues with this status
        #[arg(short, long)]
        status: Option<Status>,
    },
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => init::run(init::InitOptions {
                config: self.config,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Create {
                description,
                parent_id,
            } => issue::run_create(issue::CreateOptions {
                description,
                parent_id,
                config: self.config,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Update { id, status } => issue::run_update(issue::UpdateOptions {
                id,
                status,
                config: self.config,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::List { status } => issue::run_list(issue::ListOptions {
                status,
                config: self.config,
                json: self.json,
                quiet: self.quiet,
            }),
        }
    }
}
