use crate::cli::commands::{calendar_mode, money};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::drilldown::{DrillDownLogic, DrillLines, DrillTarget, MISSING_NAME, NO_RECORDS};
use crate::db::initialize::open_ledger;
use crate::db::queries;
use crate::errors::AppResult;
use crate::ui::messages::{empty, header};
use crate::utils::date;
use crate::utils::fmt_amount;
use crate::utils::formatting::shift_cell;
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Detail {
        worker,
        owner,
        date,
        solar,
        lunar,
    } = cmd
    {
        let target = match (worker, owner) {
            (Some(id), _) => DrillTarget::Worker(*id),
            (None, Some(id)) => DrillTarget::Owner(*id),
            (None, None) => return Ok(()),
        };

        let mode = calendar_mode(*solar, *lunar, cfg);
        let reference = date::date_or_today(date.as_ref())?;

        let pool = open_ledger(&cfg.database)?;
        let drill = DrillDownLogic::resolve(&pool.conn, target, reference, mode)?;

        // Deleted entries keep their history; show them by id.
        let name = match target {
            DrillTarget::Worker(id) => queries::find_worker(&pool.conn, id)?.map(|w| w.name),
            DrillTarget::Owner(id) => queries::find_owner(&pool.conn, id)?.map(|o| o.name),
        };
        let (kind, id) = match target {
            DrillTarget::Worker(id) => ("worker", id),
            DrillTarget::Owner(id) => ("owner", id),
        };
        header(format!(
            "{} ({kind} #{id}) · {}",
            name.as_deref().unwrap_or(MISSING_NAME),
            drill.period.label()
        ));

        if drill.lines.is_empty() {
            empty(NO_RECORDS);
            return Ok(());
        }

        match &drill.lines {
            DrillLines::Worker(lines) => {
                let mut table = Table::new(&["Date", "AM", "PM", "Days", "Wages"]);
                for l in lines {
                    table.add_row(vec![
                        l.display_date.clone(),
                        shift_cell(&l.am_owner, l.am_present),
                        shift_cell(&l.pm_owner, l.pm_present),
                        fmt_amount(l.days),
                        l.wages
                            .map(|w| money(w, cfg))
                            .unwrap_or_else(|| MISSING_NAME.to_string()),
                    ]);
                }
                print!("{}", table.render());
                let days: f64 = lines.iter().map(|l| l.days).sum();
                let wages: f64 = lines.iter().filter_map(|l| l.wages).sum();
                println!("Total: {} days, {}", fmt_amount(days), money(wages, cfg));
            }
            DrillLines::Owner(lines) => {
                let mut table = Table::new(&["Date", "Half", "Worker", "Days", "Amount"]);
                for l in lines {
                    table.add_row(vec![
                        l.display_date.clone(),
                        l.half.label().to_string(),
                        l.worker_name.clone(),
                        fmt_amount(l.days),
                        money(l.amount, cfg),
                    ]);
                }
                print!("{}", table.render());
                let days: f64 = lines.iter().map(|l| l.days).sum();
                let amount: f64 = lines.iter().map(|l| l.amount).sum();
                println!("Total: {} days, {}", fmt_amount(days), money(amount, cfg));
            }
        }
    }

    Ok(())
}
