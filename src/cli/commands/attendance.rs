use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::attendance::AttendanceLogic;
use crate::db::initialize::open_ledger;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{success, warning};
use crate::utils::date;
use chrono::NaiveDate;

fn parse_day(raw: &str) -> AppResult<NaiveDate> {
    date::parse_date(raw).ok_or_else(|| AppError::InvalidDate(raw.to_string()))
}

/// Handles `assign`, `unassign` and `mark`.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let today = date::today();

    match cmd {
        Commands::Assign {
            date,
            worker,
            half,
            owner,
        } => {
            let day = parse_day(date)?;
            let mut pool = open_ledger(&cfg.database)?;
            AttendanceLogic::assign_owner(&mut pool, day, *worker, *half, *owner, today)?;
            success(format!(
                "{day} worker #{worker} {} billed to owner #{owner}",
                half.label()
            ));
        }

        Commands::Unassign { date, worker, half } => {
            let day = parse_day(date)?;
            let mut pool = open_ledger(&cfg.database)?;
            match AttendanceLogic::clear_owner(&mut pool, day, *worker, *half, today)? {
                Some(_) => success(format!(
                    "{day} worker #{worker} {} unassigned",
                    half.label()
                )),
                None => warning(format!("No record for worker #{worker} on {day}")),
            }
        }

        Commands::Mark { date, worker, half } => {
            let day = parse_day(date)?;
            let mut pool = open_ledger(&cfg.database)?;
            let rec = AttendanceLogic::toggle_presence(&mut pool, day, *worker, *half, today)?;
            success(format!(
                "{day} worker #{worker} {} {}",
                half.label(),
                if rec.present(*half) { "present" } else { "absent" }
            ));
        }

        _ => {}
    }

    Ok(())
}
