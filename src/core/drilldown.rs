//! Drill-down resolver: the individual half-shifts behind one report line.

use crate::core::period::{BillingPeriod, display_date};
use crate::db::queries::owner_names;
use crate::errors::AppResult;
use crate::models::{CalendarMode, HalfShift, JoinedRecord};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;

/// Rendered by callers in place of an empty drill-down.
pub const NO_RECORDS: &str = "No records";

/// Owner name shown for an unassigned or deleted owner.
pub const MISSING_NAME: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillTarget {
    Worker(i64),
    Owner(i64),
}

/// One day of one worker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerDayLine {
    pub date: NaiveDate,
    pub display_date: String,
    pub am_owner: String,
    pub pm_owner: String,
    pub am_present: bool,
    pub pm_present: bool,
    pub days: f64,
    /// `None` when the worker has been deleted since.
    pub wages: Option<f64>,
}

/// One present half-shift billed to an owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerShiftLine {
    pub date: NaiveDate,
    pub display_date: String,
    pub half: HalfShift,
    pub worker_id: i64,
    pub worker_name: String,
    pub days: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrillLines {
    Worker(Vec<WorkerDayLine>),
    Owner(Vec<OwnerShiftLine>),
}

impl DrillLines {
    pub fn len(&self) -> usize {
        match self {
            DrillLines::Worker(v) => v.len(),
            DrillLines::Owner(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct DrillDown {
    pub period: BillingPeriod,
    pub target: DrillTarget,
    /// Ascending by date (then worker id, then AM before PM).
    pub lines: DrillLines,
}

pub struct DrillDownLogic;

impl DrillDownLogic {
    /// Recomputes the period from `reference` and `mode`; nothing is cached
    /// from a previous report.
    pub fn resolve(
        conn: &Connection,
        target: DrillTarget,
        reference: NaiveDate,
        mode: CalendarMode,
    ) -> AppResult<DrillDown> {
        let period = BillingPeriod::resolve(reference, mode)?;
        let records = period.load_records(conn)?;
        let owners = owner_names(conn)?;

        let lines = match target {
            DrillTarget::Worker(id) => {
                DrillLines::Worker(Self::worker_lines(&records, id, &owners, mode))
            }
            DrillTarget::Owner(id) => DrillLines::Owner(Self::owner_lines(&records, id, mode)),
        };

        Ok(DrillDown {
            period,
            target,
            lines,
        })
    }

    pub fn worker_lines(
        records: &[JoinedRecord],
        worker_id: i64,
        owners: &HashMap<i64, String>,
        mode: CalendarMode,
    ) -> Vec<WorkerDayLine> {
        let owner_name = |id: Option<i64>| {
            id.and_then(|id| owners.get(&id))
                .cloned()
                .unwrap_or_else(|| MISSING_NAME.to_string())
        };

        records
            .iter()
            .filter(|j| j.record.worker_id == worker_id)
            .map(|j| {
                let r = &j.record;
                WorkerDayLine {
                    date: r.date,
                    display_date: display_date(r.date, mode),
                    am_owner: owner_name(r.am_owner_id),
                    pm_owner: owner_name(r.pm_owner_id),
                    am_present: r.am_present,
                    pm_present: r.pm_present,
                    days: r.days_worked(),
                    wages: j.daily_rate.map(|rate| r.days_worked() * rate),
                }
            })
            .collect()
    }

    pub fn owner_lines(
        records: &[JoinedRecord],
        owner_id: i64,
        mode: CalendarMode,
    ) -> Vec<OwnerShiftLine> {
        let mut out = Vec::new();

        for j in records {
            let (Some(name), Some(rate)) = (&j.worker_name, j.daily_rate) else {
                continue;
            };

            for half in [HalfShift::Am, HalfShift::Pm] {
                if j.record.present(half) && j.record.owner(half) == Some(owner_id) {
                    out.push(OwnerShiftLine {
                        date: j.record.date,
                        display_date: display_date(j.record.date, mode),
                        half,
                        worker_id: j.record.worker_id,
                        worker_name: name.clone(),
                        days: 0.5,
                        amount: 0.5 * rate,
                    });
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttendanceRecord;

    fn rec(date: &str, worker_id: i64, am: (Option<i64>, bool), pm: (Option<i64>, bool)) -> JoinedRecord {
        JoinedRecord {
            record: AttendanceRecord {
                date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                worker_id,
                am_owner_id: am.0,
                pm_owner_id: pm.0,
                am_present: am.1,
                pm_present: pm.1,
            },
            worker_name: Some(format!("w{worker_id}")),
            daily_rate: Some(240.0),
        }
    }

    #[test]
    fn worker_lines_render_missing_owner_as_dash() {
        let owners = HashMap::from([(10, "Chen".to_string())]);
        let records = vec![
            rec("2025-03-01", 1, (Some(10), true), (Some(77), true)),
            rec("2025-03-01", 2, (Some(10), true), (None, false)),
            rec("2025-03-02", 1, (None, false), (None, false)),
        ];

        let lines = DrillDownLogic::worker_lines(&records, 1, &owners, CalendarMode::Solar);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].display_date, "2025-03-01");
        assert_eq!(lines[0].am_owner, "Chen");
        assert_eq!(lines[0].pm_owner, MISSING_NAME);
        assert_eq!(lines[0].wages, Some(240.0));
        assert_eq!(lines[1].am_owner, MISSING_NAME);
        assert_eq!(lines[1].days, 0.0);
    }

    #[test]
    fn owner_lines_split_per_half() {
        let records = vec![
            rec("2025-03-01", 1, (Some(10), true), (Some(10), true)),
            rec("2025-03-02", 1, (Some(10), false), (Some(10), true)),
            rec("2025-03-02", 2, (Some(11), true), (Some(10), false)),
        ];

        let lines = DrillDownLogic::owner_lines(&records, 10, CalendarMode::Lunar);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].half, HalfShift::Am);
        assert_eq!(lines[1].half, HalfShift::Pm);
        assert_eq!(lines[2].date, NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
        assert!(lines.iter().all(|l| l.days == 0.5 && l.amount == 120.0));
        assert_eq!(lines[0].display_date, "二月初二");
    }

    #[test]
    fn nothing_matches() {
        let records = vec![rec("2025-03-01", 1, (Some(10), true), (None, false))];
        assert!(DrillDownLogic::owner_lines(&records, 42, CalendarMode::Solar).is_empty());
        assert!(
            DrillDownLogic::worker_lines(&records, 42, &HashMap::new(), CalendarMode::Solar)
                .is_empty()
        );
    }
}
