//! Report aggregator: folds one billing period into per-worker or
//! per-owner totals.

use crate::core::period::BillingPeriod;
use crate::db::queries::owner_names;
use crate::errors::AppResult;
use crate::models::{CalendarMode, HalfShift, JoinedRecord};
use chrono::NaiveDate;
use clap::ValueEnum;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
pub enum ReportTarget {
    Worker,
    Owner,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportLine {
    pub id: i64,
    pub name: String,
    pub days: f64,
    pub wages: f64,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub period: BillingPeriod,
    pub target: ReportTarget,
    /// In order of first encounter while scanning the period by date.
    pub lines: Vec<ReportLine>,
}

impl Report {
    pub fn title(&self) -> String {
        self.period.label()
    }

    /// Lines ordered by display name, then id.
    pub fn sorted_lines(&self) -> Vec<&ReportLine> {
        let mut lines: Vec<&ReportLine> = self.lines.iter().collect();
        lines.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        lines
    }

    pub fn total_days(&self) -> f64 {
        self.lines.iter().map(|l| l.days).sum()
    }

    pub fn total_wages(&self) -> f64 {
        self.lines.iter().map(|l| l.wages).sum()
    }

    pub fn line(&self, id: i64) -> Option<&ReportLine> {
        self.lines.iter().find(|l| l.id == id)
    }
}

/// Accumulates lines keeping first-encounter order.
#[derive(Default)]
struct Totals {
    lines: Vec<ReportLine>,
    index: HashMap<i64, usize>,
}

impl Totals {
    fn credit(&mut self, id: i64, name: &str, days: f64, rate: f64) {
        let pos = match self.index.get(&id) {
            Some(pos) => *pos,
            None => {
                self.lines.push(ReportLine {
                    id,
                    name: name.to_string(),
                    days: 0.0,
                    wages: 0.0,
                });
                self.index.insert(id, self.lines.len() - 1);
                self.lines.len() - 1
            }
        };
        let line = &mut self.lines[pos];
        line.days += days;
        line.wages += days * rate;
    }
}

pub struct ReportLogic;

impl ReportLogic {
    pub fn build(
        conn: &Connection,
        reference: NaiveDate,
        mode: CalendarMode,
        target: ReportTarget,
    ) -> AppResult<Report> {
        let period = BillingPeriod::resolve(reference, mode)?;
        let records = period.load_records(conn)?;

        let lines = match target {
            ReportTarget::Worker => Self::fold_by_worker(&records),
            ReportTarget::Owner => Self::fold_by_owner(&records, &owner_names(conn)?),
        };

        Ok(Report {
            period,
            target,
            lines,
        })
    }

    /// One line per worker with at least one record in the slice.
    /// Records whose worker was deleted have no rate and are skipped.
    pub fn fold_by_worker(records: &[JoinedRecord]) -> Vec<ReportLine> {
        let mut totals = Totals::default();

        for j in records {
            let (Some(name), Some(rate)) = (&j.worker_name, j.daily_rate) else {
                continue;
            };
            totals.credit(j.record.worker_id, name, j.record.days_worked(), rate);
        }

        totals.lines
    }

    /// Each present half-shift credits its owner with 0.5 day. Halves
    /// billed to a deleted owner (or worked by a deleted worker) are
    /// dropped.
    pub fn fold_by_owner(records: &[JoinedRecord], owners: &HashMap<i64, String>) -> Vec<ReportLine> {
        let mut totals = Totals::default();

        for j in records {
            let Some(rate) = j.daily_rate else {
                continue;
            };

            for half in [HalfShift::Am, HalfShift::Pm] {
                if !j.record.present(half) {
                    continue;
                }
                let Some(owner_id) = j.record.owner(half) else {
                    continue;
                };
                if let Some(name) = owners.get(&owner_id) {
                    totals.credit(owner_id, name, 0.5, rate);
                }
            }
        }

        totals.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttendanceRecord;

    fn joined(
        date: &str,
        worker: (i64, &str, f64),
        am: (Option<i64>, bool),
        pm: (Option<i64>, bool),
    ) -> JoinedRecord {
        JoinedRecord {
            record: AttendanceRecord {
                date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                worker_id: worker.0,
                am_owner_id: am.0,
                pm_owner_id: pm.0,
                am_present: am.1,
                pm_present: pm.1,
            },
            worker_name: Some(worker.1.to_string()),
            daily_rate: Some(worker.2),
        }
    }

    #[test]
    fn worker_totals_count_half_days() {
        let w = (1, "Zhang", 200.0);
        let records = vec![
            joined("2025-03-01", w, (Some(10), true), (Some(10), false)),
            joined("2025-03-02", w, (Some(10), true), (Some(11), true)),
        ];

        let lines = ReportLogic::fold_by_worker(&records);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].days, 1.5);
        assert_eq!(lines[0].wages, 300.0);
    }

    #[test]
    fn same_owner_twice_in_one_day() {
        let owners = HashMap::from([(10, "Chen".to_string())]);
        let records = vec![joined(
            "2025-03-01",
            (1, "Zhang", 200.0),
            (Some(10), true),
            (Some(10), true),
        )];

        let lines = ReportLogic::fold_by_owner(&records, &owners);
        assert_eq!(
            lines,
            vec![ReportLine {
                id: 10,
                name: "Chen".into(),
                days: 1.0,
                wages: 200.0
            }]
        );
    }

    #[test]
    fn split_day_credits_two_owners_in_encounter_order() {
        let owners = HashMap::from([(10, "Chen".to_string()), (11, "Wang".to_string())]);
        let records = vec![
            joined("2025-03-01", (1, "Zhang", 200.0), (Some(11), true), (Some(10), true)),
            joined("2025-03-01", (2, "Li", 300.0), (Some(10), true), (None, false)),
        ];

        let lines = ReportLogic::fold_by_owner(&records, &owners);
        let ids: Vec<i64> = lines.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![11, 10]);
        assert_eq!(lines[1].days, 1.0);
        assert_eq!(lines[1].wages, 250.0);
    }

    #[test]
    fn dangling_references_are_skipped() {
        let owners = HashMap::from([(10, "Chen".to_string())]);
        let mut orphan = joined("2025-03-02", (2, "gone", 100.0), (Some(10), true), (None, false));
        orphan.worker_name = None;
        orphan.daily_rate = None;
        let records = vec![
            joined("2025-03-01", (1, "Zhang", 200.0), (Some(99), true), (Some(10), true)),
            orphan,
        ];

        let by_owner = ReportLogic::fold_by_owner(&records, &owners);
        assert_eq!(by_owner.len(), 1);
        assert_eq!(by_owner[0].days, 0.5);

        let by_worker = ReportLogic::fold_by_worker(&records);
        assert_eq!(by_worker.len(), 1);
        assert_eq!(by_worker[0].id, 1);
    }

    #[test]
    fn empty_period_yields_no_lines() {
        assert!(ReportLogic::fold_by_worker(&[]).is_empty());
        assert!(ReportLogic::fold_by_owner(&[], &HashMap::new()).is_empty());
    }
}
