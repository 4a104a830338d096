//! CLI argument definitions.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use taskdeck_core::{Priority, SortDirection, SortKey, StatusFilter};

/// Top-level CLI parser for `taskdeck`.
#[derive(Debug, Parser)]
#[command(name = "taskdeck", version, about = "Keep a small ordered task list")]
pub struct Cli {
    /// Config file to load instead of the default search path.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database file (overrides `storage.db_path`).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Log level (overrides `logging.level`).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Append a new task.
    Add(AddArgs),
    /// Show tasks, optionally filtered and sorted.
    List(ListArgs),
    /// Flip a task between active and completed.
    Toggle {
        /// Task id or unique id prefix.
        id: String,
    },
    /// Change fields of an existing task.
    Update(UpdateArgs),
    /// Remove a task.
    Delete {
        /// Task id or unique id prefix.
        id: String,
    },
    /// Remove every completed task.
    ClearCompleted,
    /// Print total, active and completed counts.
    Stats,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub priority: Option<Priority>,
    /// Due date as YYYY-MM-DD.
    #[arg(long)]
    pub due: Option<NaiveDate>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// all | active | completed
    #[arg(long)]
    pub status: Option<StatusFilter>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub priority: Option<Priority>,
    /// Case-insensitive text to look for in title or description.
    #[arg(long)]
    pub search: Option<String>,
    /// title | due | priority | created
    #[arg(long)]
    pub sort: Option<SortKey>,
    /// asc | desc
    #[arg(long)]
    pub direction: Option<SortDirection>,
    /// Print tasks as a JSON array.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Task id or unique id prefix.
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, conflicts_with = "clear_category")]
    pub category: Option<String>,
    #[arg(long)]
    pub clear_category: bool,
    #[arg(long, conflicts_with = "clear_priority")]
    pub priority: Option<Priority>,
    #[arg(long)]
    pub clear_priority: bool,
    #[arg(long, conflicts_with = "clear_due")]
    pub due: Option<NaiveDate>,
    #[arg(long)]
    pub clear_due: bool,
}
