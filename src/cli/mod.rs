//! Command-line interface for dayplan
//!
//! This module defines the CLI structure using clap derive macros.
//! Task subcommands live in the `tasks` submodule; `ui` launches the
//! interactive day view.

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::events::EventDestination;
use crate::output::OutputOptions;
use crate::storage::Storage;

pub mod tasks;

/// dayplan - a day-timeline task manager
///
/// Tasks are timed intervals on a 24-hour day. Manage them from the
/// command line or interactively on a draggable timeline with `dayplan ui`.
#[derive(Parser, Debug)]
#[command(name = "dayplan")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the task store file (defaults to the platform data directory)
    #[arg(long, global = true, env = "DAYPLAN_STORE")]
    pub store: Option<std::path::PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit change events as JSONL to a file, or "-" for stdout
    #[arg(long, global = true, env = "DAYPLAN_EVENTS")]
    pub events: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a task
    Add {
        /// Task name
        name: String,

        /// Start time (HH:MM on the given date, or a full RFC 3339 timestamp)
        #[arg(long)]
        start: String,

        /// End time (defaults to one hour after the start)
        #[arg(long)]
        end: Option<String>,

        /// Date the HH:MM times refer to (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List tasks
    List {
        /// Only tasks intersecting this date (YYYY-MM-DD or "today");
        /// every stored task when omitted
        #[arg(long)]
        date: Option<String>,
    },

    /// Edit a task's name or times
    Edit {
        /// Task id (a unique prefix is enough)
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New start time
        #[arg(long)]
        start: Option<String>,

        /// New end time
        #[arg(long)]
        end: Option<String>,

        /// Date the HH:MM times refer to (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Remove a task
    Rm {
        /// Task id (a unique prefix is enough)
        id: String,
    },

    /// Open the interactive day view
    Ui {
        /// Date to open on (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let config = Config::discover()?;
        let storage = resolve_storage(self.store.as_deref(), &config)?;
        let output = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        let events = EventDestination::parse(self.events.as_deref());

        match self.command {
            Commands::Add {
                name,
                start,
                end,
                date,
            } => tasks::run_add(tasks::AddOptions {
                name,
                start,
                end,
                date,
                storage,
                output,
                events,
            }),
            Commands::List { date } => tasks::run_list(tasks::ListOptions {
                date,
                storage,
                output,
            }),
            Commands::Edit {
                id,
                name,
                start,
                end,
                date,
            } => tasks::run_edit(tasks::EditOptions {
                id,
                name,
                start,
                end,
                date,
                storage,
                output,
                events,
            }),
            Commands::Rm { id } => tasks::run_rm(tasks::RmOptions {
                id,
                storage,
                output,
                events,
            }),
            Commands::Ui { date } => {
                let date = match date {
                    Some(raw) => tasks::parse_date(&raw)?,
                    None => chrono::Local::now().date_naive(),
                };
                let sink = events.map(|dest| dest.open()).transpose()?;
                crate::ui::day_view::run(storage, config, date, sink)
            }
        }
    }
}

/// Pick the store location: explicit flag, then config, then the platform
/// data directory.
fn resolve_storage(flag: Option<&std::path::Path>, config: &Config) -> Result<Storage> {
    if let Some(path) = flag {
        return Ok(Storage::new(path.to_path_buf()));
    }
    if let Some(path) = &config.store.path {
        return Ok(Storage::new(path.clone()));
    }
    Storage::default_location()
}
