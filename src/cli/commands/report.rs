use crate::cli::commands::{calendar_mode, money};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::drilldown::NO_RECORDS;
use crate::core::period::BillingPeriod;
use crate::core::report::{Report, ReportLogic, ReportTarget};
use crate::db::initialize::open_ledger;
use crate::errors::AppResult;
use crate::ui::messages::{empty, header, success};
use crate::utils::date;
use crate::utils::fmt_amount;
use crate::utils::table::Table;
use std::path::Path;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Report {
        date,
        solar,
        lunar,
        by,
        shift,
        csv,
    } = cmd
    {
        let mode = calendar_mode(*solar, *lunar, cfg);
        let reference = date::date_or_today(date.as_ref())?;

        // Step to the wanted neighbour period, then report on its first day.
        let mut period = BillingPeriod::resolve(reference, mode)?;
        for _ in 0..shift.unsigned_abs() {
            period = if *shift < 0 {
                period.previous()?
            } else {
                period.next()?
            };
        }

        let pool = open_ledger(&cfg.database)?;
        let report = ReportLogic::build(&pool.conn, period.start, mode, *by)?;

        print_report(&report, cfg);

        if let Some(path) = csv {
            write_csv(&report, Path::new(path))?;
            success(format!("CSV written to {}", path));
        }
    }

    Ok(())
}

fn print_report(report: &Report, cfg: &Config) {
    let who = match report.target {
        ReportTarget::Worker => "Worker",
        ReportTarget::Owner => "Owner",
    };
    header(format!("{} · by {}", report.title(), who.to_lowercase()));

    if report.lines.is_empty() {
        empty(NO_RECORDS);
        return;
    }

    let mut table = Table::new(&["ID", who, "Days", "Wages"]);
    for line in report.sorted_lines() {
        table.add_row(vec![
            line.id.to_string(),
            line.name.clone(),
            fmt_amount(line.days),
            money(line.wages, cfg),
        ]);
    }
    print!("{}", table.render());
    println!(
        "Total: {} days, {}",
        fmt_amount(report.total_days()),
        money(report.total_wages(), cfg)
    );
}

fn write_csv(report: &Report, path: &Path) -> AppResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["id", "name", "days", "wages"])?;
    for line in report.sorted_lines() {
        wtr.write_record([
            line.id.to_string(),
            line.name.clone(),
            fmt_amount(line.days),
            fmt_amount(line.wages),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
