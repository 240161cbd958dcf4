use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::initialize::open_ledger;
use crate::db::journal::record_quietly;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file (skipped in test mode)
///  - the SQLite ledger with all pending migrations
pub fn handle(cli: &Cli) -> AppResult<()> {
    info("Initializing rShiftbook…");

    let cfg = Config::init_all(cli.db.clone(), cli.test)?;
    let pool = open_ledger(&cfg.database)?;

    record_quietly(
        &pool.conn,
        "init",
        &cfg.database,
        &format!("Ledger initialized at {}", cfg.database),
    );

    success(format!("Ledger initialized at {}", cfg.database));
    Ok(())
}
