use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::journal::JournalLogic;
use crate::db::initialize::open_ledger;
use crate::errors::AppResult;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if matches!(cmd, Commands::Journal { print: true }) {
        let mut pool = open_ledger(&cfg.database)?;
        JournalLogic::print_journal(&mut pool)?;
    }

    Ok(())
}
