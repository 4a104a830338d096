//! taskdeck command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration, start logging and open the task database.
//! - Dispatch one subcommand and report failures on stderr.

mod cli;
mod commands;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use config::Config;
use log::{error, info};
use std::process::ExitCode;
use taskdeck_core::db::open_db;
use taskdeck_core::{SqliteTaskRepository, TaskService};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=command module=cli status=error error={err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(db) = cli.db {
        config.storage.db_path = Some(db);
    }

    if config.logging.enabled {
        let log_dir = config.log_dir()?;
        taskdeck_core::init_logging(&config.logging.level, &log_dir)
            .context("failed to initialize logging")?;
    }

    let db_path = config.db_path()?;
    if let Some(parent) = db_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let conn = open_db(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;
    let repo = SqliteTaskRepository::try_new(&conn)?;
    let mut service = TaskService::open(repo)?;

    info!(
        "event=command module=cli status=start core_version={}",
        taskdeck_core::core_version()
    );
    let stdout = std::io::stdout();
    commands::run(cli.command, &mut service, &config, &mut stdout.lock())
}
