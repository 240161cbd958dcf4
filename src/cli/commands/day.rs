use crate::cli::commands::money;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::attendance::AttendanceLogic;
use crate::core::calendar::LUNAR_PLACEHOLDER;
use crate::core::drilldown::MISSING_NAME;
use crate::db::initialize::open_ledger;
use crate::errors::AppResult;
use crate::ui::messages::{empty, header};
use crate::utils::date;
use crate::utils::formatting::shift_cell;
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Day { date } = cmd {
        let day = date::date_or_today(date.as_ref())?;
        let pool = open_ledger(&cfg.database)?;
        let sheet = AttendanceLogic::day_sheet(&pool.conn, day, date::today())?;

        let today = if sheet.is_today { " (today)" } else { "" };
        let lunar = if sheet.lunar == LUNAR_PLACEHOLDER {
            sheet.lunar.clone()
        } else {
            format!("农历 {}", sheet.lunar)
        };
        header(format!("{}{} · {}", sheet.date, today, lunar));

        if sheet.rows.is_empty() {
            empty("No workers");
            return Ok(());
        }

        let mut table = Table::new(&["ID", "Worker", "AM", "PM", "Wage"]);
        for row in &sheet.rows {
            table.add_row(vec![
                row.worker.id.to_string(),
                row.worker.name.clone(),
                shift_cell(row.am_owner.as_deref().unwrap_or(MISSING_NAME), row.record.am_present),
                shift_cell(row.pm_owner.as_deref().unwrap_or(MISSING_NAME), row.record.pm_present),
                money(row.wage, cfg),
            ]);
        }
        print!("{}", table.render());
        println!("Total: {}", money(sheet.total_wage(), cfg));
    }

    Ok(())
}
