use crate::cli::commands::money;
use crate::cli::parser::{Commands, RosterAction};
use crate::config::Config;
use crate::core::attendance::AttendanceLogic;
use crate::db::initialize::open_ledger;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{empty, header, success};
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    match cmd {
        Commands::Worker { action } => workers(action, cfg),
        Commands::Owner { action } => owners(action, cfg),
        _ => Ok(()),
    }
}

fn parse_rate(raw: Option<&str>) -> AppResult<f64> {
    let raw = raw.ok_or_else(|| AppError::Validation("--rate is required for workers".into()))?;
    raw.trim()
        .parse::<f64>()
        .map_err(|_| AppError::InvalidAmount(raw.to_string()))
}

fn workers(action: &RosterAction, cfg: &Config) -> AppResult<()> {
    let mut pool = open_ledger(&cfg.database)?;

    match action {
        RosterAction::Add { name, rate } => {
            let rate = parse_rate(rate.as_deref())?;
            let id = AttendanceLogic::add_worker(&mut pool, name, rate)?;
            success(format!(
                "Worker #{id} added: {} ({}/day)",
                name.trim(),
                money(rate, cfg)
            ));
        }
        RosterAction::List => {
            let list = queries::list_workers(&pool.conn)?;
            if list.is_empty() {
                empty("No workers");
                return Ok(());
            }

            header("Workers");
            let mut table = Table::new(&["ID", "Name", "Daily rate"]);
            for w in list {
                table.add_row(vec![w.id.to_string(), w.name, money(w.daily_rate, cfg)]);
            }
            print!("{}", table.render());
        }
        RosterAction::Del { id } => {
            AttendanceLogic::remove_worker(&mut pool, *id)?;
            success(format!("Worker #{id} deleted (attendance kept)"));
        }
    }

    Ok(())
}

fn owners(action: &RosterAction, cfg: &Config) -> AppResult<()> {
    let mut pool = open_ledger(&cfg.database)?;

    match action {
        RosterAction::Add { name, rate } => {
            if rate.is_some() {
                return Err(AppError::Validation("owners have no daily rate".into()));
            }
            let id = AttendanceLogic::add_owner(&mut pool, name)?;
            success(format!("Owner #{id} added: {}", name.trim()));
        }
        RosterAction::List => {
            let list = queries::list_owners(&pool.conn)?;
            if list.is_empty() {
                empty("No owners");
                return Ok(());
            }

            header("Owners");
            let mut table = Table::new(&["ID", "Name"]);
            for o in list {
                table.add_row(vec![o.id.to_string(), o.name]);
            }
            print!("{}", table.render());
        }
        RosterAction::Del { id } => {
            AttendanceLogic::remove_owner(&mut pool, *id)?;
            success(format!("Owner #{id} deleted (attendance kept)"));
        }
    }

    Ok(())
}
