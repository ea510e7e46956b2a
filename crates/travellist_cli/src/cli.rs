use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[clap(name = "travellist", version, about = "Personal travel journal")]
pub struct CommandLine {
    /// SQLite database file. Overrides TRAVELLIST_DB_PATH.
    #[clap(long, global = true)]
    pub db: Option<PathBuf>,
    /// Directory for rotating log files. Overrides TRAVELLIST_LOG_DIR.
    #[clap(long = "log-dir", global = true)]
    pub log_dir: Option<PathBuf>,
    /// Log level (trace|debug|info|warn|error). Overrides TRAVELLIST_LOG_LEVEL.
    #[clap(long = "log-level", global = true)]
    pub log_level: Option<String>,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List trips, most recent year first.
    List {
        /// Ordering clause, e.g. "year DESC" or "city ASC".
        #[clap(long)]
        order: Option<String>,
        /// Comma-separated columns to print as JSON, e.g. "id,city".
        #[clap(long)]
        columns: Option<String>,
        #[clap(long, action)]
        json: bool,
    },
    /// Show one trip.
    Show { id: i64 },
    /// Record a new trip.
    Add {
        #[clap(long)]
        city: String,
        #[clap(long)]
        country: String,
        #[clap(long)]
        year: i32,
        #[clap(long)]
        note: Option<String>,
        /// Use this id instead of the next free one.
        #[clap(long)]
        id: Option<i64>,
    },
    /// Change fields of an existing trip. Omitted fields keep their value.
    Edit {
        id: i64,
        #[clap(long)]
        city: Option<String>,
        #[clap(long)]
        country: Option<String>,
        #[clap(long)]
        year: Option<i32>,
        /// Pass an empty string to clear the note.
        #[clap(long)]
        note: Option<String>,
    },
    /// Delete a trip. Deleting a missing trip is not an error.
    Delete { id: i64 },
    /// Print a trip in shareable plain text.
    Share { id: i64 },
}

impl Command {
    /// Subcommand name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::List { .. } => "list",
            Self::Show { .. } => "show",
            Self::Add { .. } => "add",
            Self::Edit { .. } => "edit",
            Self::Delete { .. } => "delete",
            Self::Share { .. } => "share",
        }
    }
}
