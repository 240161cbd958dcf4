//! Data-entry boundary of the ledger: roster changes, owner assignment and
//! presence toggles. Validation happens here, before anything is written.

use crate::core::calendar::lunar_label;
use crate::db::journal::record_quietly;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::{AttendanceRecord, HalfShift, Worker};
use chrono::NaiveDate;
use rusqlite::Connection;
use std::collections::HashMap;

/// High-level business logic for roster and attendance commands.
pub struct AttendanceLogic;

fn ensure_not_future(date: NaiveDate, today: NaiveDate) -> AppResult<()> {
    if date > today {
        return Err(AppError::Validation(format!(
            "cannot record the future ({date} is after {today})"
        )));
    }
    Ok(())
}

fn clean_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name must not be empty".into()));
    }
    Ok(name.to_string())
}

impl AttendanceLogic {
    // ---------------------------
    // Roster
    // ---------------------------

    pub fn add_worker(pool: &mut DbPool, name: &str, daily_rate: f64) -> AppResult<i64> {
        let name = clean_name(name)?;
        if !daily_rate.is_finite() || daily_rate < 0.0 {
            return Err(AppError::Validation(format!(
                "daily rate must be a non-negative amount, got {daily_rate}"
            )));
        }

        let id = queries::create_worker(&pool.conn, &name, daily_rate)?;
        record_quietly(
            &pool.conn,
            "worker_add",
            &format!("worker #{id}"),
            &format!("{name} ({daily_rate}/day)"),
        );
        Ok(id)
    }

    pub fn add_owner(pool: &mut DbPool, name: &str) -> AppResult<i64> {
        let name = clean_name(name)?;
        let id = queries::create_owner(&pool.conn, &name)?;
        record_quietly(&pool.conn, "owner_add", &format!("owner #{id}"), &name);
        Ok(id)
    }

    /// Attendance rows of the worker are kept.
    pub fn remove_worker(pool: &mut DbPool, id: i64) -> AppResult<()> {
        if !queries::delete_worker(&pool.conn, id)? {
            return Err(AppError::WorkerNotFound(id));
        }
        record_quietly(&pool.conn, "worker_del", &format!("worker #{id}"), "Worker deleted");
        Ok(())
    }

    /// Attendance rows billed to the owner are kept.
    pub fn remove_owner(pool: &mut DbPool, id: i64) -> AppResult<()> {
        if !queries::delete_owner(&pool.conn, id)? {
            return Err(AppError::OwnerNotFound(id));
        }
        record_quietly(&pool.conn, "owner_del", &format!("owner #{id}"), "Owner deleted");
        Ok(())
    }

    // ---------------------------
    // Attendance
    // ---------------------------

    /// Bill one half-shift of `worker_id` on `date` to `owner_id`.
    ///
    /// The other half-shift is left untouched. Creates the day's record
    /// when none exists.
    pub fn assign_owner(
        pool: &mut DbPool,
        date: NaiveDate,
        worker_id: i64,
        half: HalfShift,
        owner_id: i64,
        today: NaiveDate,
    ) -> AppResult<AttendanceRecord> {
        ensure_not_future(date, today)?;

        let tx = pool.write_tx()?;
        if queries::find_worker(&tx, worker_id)?.is_none() {
            return Err(AppError::WorkerNotFound(worker_id));
        }
        if queries::find_owner(&tx, owner_id)?.is_none() {
            return Err(AppError::OwnerNotFound(owner_id));
        }

        let mut rec = queries::get_attendance(&tx, &date, worker_id)?
            .unwrap_or_else(|| AttendanceRecord::empty(date, worker_id));
        rec.set_owner(half, Some(owner_id));
        queries::upsert_attendance(&tx, &rec)?;
        record_quietly(
            &tx,
            "assign",
            &format!("{date} worker #{worker_id}"),
            &format!("{} → owner #{owner_id}", half.label()),
        );
        tx.commit()?;

        Ok(rec)
    }

    /// Unassign one half-shift. Its presence flag is cleared with it.
    pub fn clear_owner(
        pool: &mut DbPool,
        date: NaiveDate,
        worker_id: i64,
        half: HalfShift,
        today: NaiveDate,
    ) -> AppResult<Option<AttendanceRecord>> {
        ensure_not_future(date, today)?;

        let tx = pool.write_tx()?;
        let Some(mut rec) = queries::get_attendance(&tx, &date, worker_id)? else {
            return Ok(None);
        };
        rec.set_owner(half, None);
        rec.set_present(half, false);
        queries::upsert_attendance(&tx, &rec)?;
        record_quietly(
            &tx,
            "unassign",
            &format!("{date} worker #{worker_id}"),
            &format!("{} owner cleared", half.label()),
        );
        tx.commit()?;

        Ok(Some(rec))
    }

    /// Flip presence for one half-shift.
    ///
    /// Fails with `Validation` (and writes nothing) when that half has no
    /// owner yet.
    pub fn toggle_presence(
        pool: &mut DbPool,
        date: NaiveDate,
        worker_id: i64,
        half: HalfShift,
        today: NaiveDate,
    ) -> AppResult<AttendanceRecord> {
        ensure_not_future(date, today)?;

        let tx = pool.write_tx()?;
        let mut rec = queries::get_attendance(&tx, &date, worker_id)?
            .unwrap_or_else(|| AttendanceRecord::empty(date, worker_id));

        if rec.owner(half).is_none() {
            return Err(AppError::Validation(format!(
                "assign an owner to the {} half-shift before marking attendance",
                half.label()
            )));
        }

        let present = !rec.present(half);
        rec.set_present(half, present);
        queries::upsert_attendance(&tx, &rec)?;
        record_quietly(
            &tx,
            "toggle",
            &format!("{date} worker #{worker_id}"),
            &format!(
                "{} {}",
                half.label(),
                if present { "present" } else { "absent" }
            ),
        );
        tx.commit()?;

        Ok(rec)
    }

    // ---------------------------
    // Day sheet
    // ---------------------------

    pub fn day_sheet(conn: &Connection, date: NaiveDate, today: NaiveDate) -> AppResult<DaySheet> {
        let owners: HashMap<i64, String> = queries::owner_names(conn)?;

        let mut rows = Vec::new();
        for worker in queries::list_workers(conn)? {
            let record = queries::get_attendance(conn, &date, worker.id)?
                .unwrap_or_else(|| AttendanceRecord::empty(date, worker.id));
            let am_owner = record.am_owner_id.and_then(|id| owners.get(&id).cloned());
            let pm_owner = record.pm_owner_id.and_then(|id| owners.get(&id).cloned());
            let wage = record.days_worked() * worker.daily_rate;

            rows.push(DaySheetRow {
                worker,
                record,
                am_owner,
                pm_owner,
                wage,
            });
        }

        Ok(DaySheet {
            date,
            is_today: date == today,
            lunar: lunar_label(date),
            rows,
        })
    }
}

/// One worker on the data-entry sheet.
#[derive(Debug, Clone)]
pub struct DaySheetRow {
    pub worker: Worker,
    pub record: AttendanceRecord,
    /// `None` when unassigned or the owner has been deleted.
    pub am_owner: Option<String>,
    pub pm_owner: Option<String>,
    pub wage: f64,
}

#[derive(Debug, Clone)]
pub struct DaySheet {
    pub date: NaiveDate,
    pub is_today: bool,
    pub lunar: String,
    pub rows: Vec<DaySheetRow>,
}

impl DaySheet {
    pub fn total_wage(&self) -> f64 {
        self.rows.iter().map(|r| r.wage).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;

    fn pool() -> DbPool {
        let pool = DbPool::in_memory().unwrap();
        init_db(&pool.conn).unwrap();
        pool
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn toggle_without_owner_is_rejected_and_writes_nothing() {
        let mut pool = pool();
        let w = AttendanceLogic::add_worker(&mut pool, "Zhang", 200.0).unwrap();
        let day = d("2025-03-04");

        let err = AttendanceLogic::toggle_presence(&mut pool, day, w, HalfShift::Am, day);
        assert!(matches!(err, Err(AppError::Validation(_))));
        assert_eq!(queries::get_attendance(&pool.conn, &day, w).unwrap(), None);
    }

    #[test]
    fn toggle_keeps_state_when_other_half_unassigned() {
        let mut pool = pool();
        let w = AttendanceLogic::add_worker(&mut pool, "Zhang", 200.0).unwrap();
        let o = AttendanceLogic::add_owner(&mut pool, "Chen").unwrap();
        let day = d("2025-03-04");

        AttendanceLogic::assign_owner(&mut pool, day, w, HalfShift::Am, o, day).unwrap();
        AttendanceLogic::toggle_presence(&mut pool, day, w, HalfShift::Am, day).unwrap();
        let before = queries::get_attendance(&pool.conn, &day, w).unwrap();

        let err = AttendanceLogic::toggle_presence(&mut pool, day, w, HalfShift::Pm, day);
        assert!(matches!(err, Err(AppError::Validation(_))));
        assert_eq!(queries::get_attendance(&pool.conn, &day, w).unwrap(), before);
    }

    #[test]
    fn assigning_one_half_preserves_the_other() {
        let mut pool = pool();
        let w = AttendanceLogic::add_worker(&mut pool, "Zhang", 200.0).unwrap();
        let a = AttendanceLogic::add_owner(&mut pool, "Chen").unwrap();
        let b = AttendanceLogic::add_owner(&mut pool, "Wang").unwrap();
        let day = d("2025-03-04");

        AttendanceLogic::assign_owner(&mut pool, day, w, HalfShift::Am, a, day).unwrap();
        AttendanceLogic::toggle_presence(&mut pool, day, w, HalfShift::Am, day).unwrap();
        let rec = AttendanceLogic::assign_owner(&mut pool, day, w, HalfShift::Pm, b, day).unwrap();

        assert_eq!(rec.am_owner_id, Some(a));
        assert!(rec.am_present);
        assert_eq!(rec.pm_owner_id, Some(b));
        assert!(!rec.pm_present);
    }

    #[test]
    fn clearing_owner_clears_presence() {
        let mut pool = pool();
        let w = AttendanceLogic::add_worker(&mut pool, "Zhang", 200.0).unwrap();
        let a = AttendanceLogic::add_owner(&mut pool, "Chen").unwrap();
        let day = d("2025-03-04");

        AttendanceLogic::assign_owner(&mut pool, day, w, HalfShift::Pm, a, day).unwrap();
        AttendanceLogic::toggle_presence(&mut pool, day, w, HalfShift::Pm, day).unwrap();
        let rec = AttendanceLogic::clear_owner(&mut pool, day, w, HalfShift::Pm, day)
            .unwrap()
            .unwrap();
        assert_eq!(rec, AttendanceRecord::empty(day, w));
    }

    #[test]
    fn future_dates_are_rejected() {
        let mut pool = pool();
        let w = AttendanceLogic::add_worker(&mut pool, "Zhang", 200.0).unwrap();
        let o = AttendanceLogic::add_owner(&mut pool, "Chen").unwrap();

        let err = AttendanceLogic::assign_owner(
            &mut pool,
            d("2025-03-05"),
            w,
            HalfShift::Am,
            o,
            d("2025-03-04"),
        );
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[test]
    fn roster_validation() {
        let mut pool = pool();
        assert!(matches!(
            AttendanceLogic::add_worker(&mut pool, "  ", 100.0),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            AttendanceLogic::add_worker(&mut pool, "Li", -1.0),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            AttendanceLogic::remove_owner(&mut pool, 9),
            Err(AppError::OwnerNotFound(9))
        ));
    }

    #[test]
    fn day_sheet_lists_every_worker() {
        let mut pool = pool();
        let w1 = AttendanceLogic::add_worker(&mut pool, "Zhang", 200.0).unwrap();
        AttendanceLogic::add_worker(&mut pool, "Li", 300.0).unwrap();
        let o = AttendanceLogic::add_owner(&mut pool, "Chen").unwrap();
        let day = d("2024-02-24");

        AttendanceLogic::assign_owner(&mut pool, day, w1, HalfShift::Am, o, day).unwrap();
        AttendanceLogic::toggle_presence(&mut pool, day, w1, HalfShift::Am, day).unwrap();
        AttendanceLogic::remove_owner(&mut pool, o).unwrap();

        let sheet = AttendanceLogic::day_sheet(&pool.conn, day, day).unwrap();
        assert!(sheet.is_today);
        assert_eq!(sheet.lunar, "正月十五");
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].am_owner, None);
        assert_eq!(sheet.rows[0].wage, 100.0);
        assert_eq!(sheet.total_wage(), 100.0);
    }
}
