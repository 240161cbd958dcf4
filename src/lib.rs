//! rShiftbook library root.
//! Exposes CLI parser, high-level run() function, and internal modules.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    use crate::cli::commands as c;

    match &cli.command {
        Commands::Init => c::init::handle(cli),
        Commands::Config { .. } => c::config::handle(&cli.command, cfg),
        Commands::Db { .. } => c::db::handle(&cli.command, cfg),
        Commands::Journal { .. } => c::journal::handle(&cli.command, cfg),
        Commands::Worker { .. } | Commands::Owner { .. } => c::roster::handle(&cli.command, cfg),
        Commands::Assign { .. } | Commands::Unassign { .. } | Commands::Mark { .. } => {
            c::attendance::handle(&cli.command, cfg)
        }
        Commands::Day { .. } => c::day::handle(&cli.command, cfg),
        Commands::Report { .. } => c::report::handle(&cli.command, cfg),
        Commands::Detail { .. } => c::detail::handle(&cli.command, cfg),
        Commands::Backup { .. } | Commands::Restore { .. } | Commands::SendBackup { .. } => {
            c::backup::handle(&cli.command, cfg)
        }
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    // 1️⃣ parse CLI
    let cli = Cli::parse();

    // 2️⃣ load config once
    let mut cfg = Config::load()?;

    // 3️⃣ command-line DB override
    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }

    // 4️⃣ dispatch, then the daily automatic backup if something changed
    dispatch(&cli, &cfg)?;
    if cli.command.is_mutation() && !cli.test {
        cli::commands::backup::auto_backup_after_change(&cfg);
    }

    Ok(())
}
