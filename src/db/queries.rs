//! Ledger store: CRUD and point lookups over workers, owners and logs.
//!
//! Functions take a plain `&Connection` so they run equally well on the
//! pool connection or inside a `Transaction`.

use crate::errors::{AppError, AppResult};
use crate::models::{AttendanceRecord, JoinedRecord, Owner, Worker};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};
use std::collections::HashMap;

const DATE_FMT: &str = "%Y-%m-%d";

const JOINED_SELECT: &str = "SELECT l.date, l.worker_id, l.am_owner_id, l.pm_owner_id, l.am, l.pm,
            w.name, w.daily_rate
     FROM logs l
     LEFT JOIN workers w ON l.worker_id = w.id";

// ---------------------------
// Workers
// ---------------------------

pub fn create_worker(conn: &Connection, name: &str, daily_rate: f64) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO workers (name, daily_rate) VALUES (?1, ?2)",
        params![name, daily_rate],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Returns `false` when no worker had that id. Attendance rows are kept.
pub fn delete_worker(conn: &Connection, id: i64) -> AppResult<bool> {
    let n = conn.execute("DELETE FROM workers WHERE id = ?1", [id])?;
    Ok(n > 0)
}

pub fn list_workers(conn: &Connection) -> AppResult<Vec<Worker>> {
    let mut stmt = conn.prepare_cached("SELECT id, name, daily_rate FROM workers ORDER BY id ASC")?;
    let rows = stmt.query_map([], map_worker)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn find_worker(conn: &Connection, id: i64) -> AppResult<Option<Worker>> {
    let worker = conn
        .query_row(
            "SELECT id, name, daily_rate FROM workers WHERE id = ?1",
            [id],
            map_worker,
        )
        .optional()?;
    Ok(worker)
}

fn map_worker(row: &Row) -> Result<Worker> {
    Ok(Worker {
        id: row.get(0)?,
        name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        daily_rate: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
    })
}

// ---------------------------
// Owners
// ---------------------------

pub fn create_owner(conn: &Connection, name: &str) -> AppResult<i64> {
    conn.execute("INSERT INTO owners (name) VALUES (?1)", [name])?;
    Ok(conn.last_insert_rowid())
}

/// Returns `false` when no owner had that id. Attendance rows are kept.
pub fn delete_owner(conn: &Connection, id: i64) -> AppResult<bool> {
    let n = conn.execute("DELETE FROM owners WHERE id = ?1", [id])?;
    Ok(n > 0)
}

pub fn list_owners(conn: &Connection) -> AppResult<Vec<Owner>> {
    let mut stmt = conn.prepare_cached("SELECT id, name FROM owners ORDER BY id ASC")?;
    let rows = stmt.query_map([], map_owner)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn find_owner(conn: &Connection, id: i64) -> AppResult<Option<Owner>> {
    let owner = conn
        .query_row("SELECT id, name FROM owners WHERE id = ?1", [id], map_owner)
        .optional()?;
    Ok(owner)
}

/// id → name for every live owner.
pub fn owner_names(conn: &Connection) -> AppResult<HashMap<i64, String>> {
    Ok(list_owners(conn)?
        .into_iter()
        .map(|o| (o.id, o.name))
        .collect())
}

fn map_owner(row: &Row) -> Result<Owner> {
    Ok(Owner {
        id: row.get(0)?,
        name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
    })
}

// ---------------------------
// Attendance
// ---------------------------

/// Insert or replace the whole record keyed by (date, worker_id).
pub fn upsert_attendance(conn: &Connection, rec: &AttendanceRecord) -> AppResult<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT OR REPLACE INTO logs (date, worker_id, am_owner_id, pm_owner_id, am, pm)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    stmt.execute(params![
        rec.date_str(),
        rec.worker_id,
        rec.am_owner_id,
        rec.pm_owner_id,
        rec.am_present as i64,
        rec.pm_present as i64,
    ])?;
    Ok(())
}

pub fn get_attendance(
    conn: &Connection,
    date: &NaiveDate,
    worker_id: i64,
) -> AppResult<Option<AttendanceRecord>> {
    let rec = conn
        .query_row(
            "SELECT date, worker_id, am_owner_id, pm_owner_id, am, pm
             FROM logs WHERE date = ?1 AND worker_id = ?2",
            params![date.format(DATE_FMT).to_string(), worker_id],
            map_attendance,
        )
        .optional()?;
    Ok(rec)
}

/// Records with `start <= date <= end`, ordered by date then worker id.
pub fn query_attendance_range(
    conn: &Connection,
    start: &NaiveDate,
    end: &NaiveDate,
) -> AppResult<Vec<JoinedRecord>> {
    let sql = format!(
        "{JOINED_SELECT}
         WHERE l.date BETWEEN ?1 AND ?2
         ORDER BY l.date ASC, l.worker_id ASC"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(
        params![
            start.format(DATE_FMT).to_string(),
            end.format(DATE_FMT).to_string()
        ],
        map_joined,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Records whose date starts with `prefix` (e.g. "2025-03").
pub fn query_attendance_month(conn: &Connection, prefix: &str) -> AppResult<Vec<JoinedRecord>> {
    if prefix.len() != 7 || NaiveDate::parse_from_str(&format!("{prefix}-01"), DATE_FMT).is_err() {
        return Err(AppError::InvalidDate(prefix.to_string()));
    }

    let sql = format!(
        "{JOINED_SELECT}
         WHERE l.date LIKE ?1
         ORDER BY l.date ASC, l.worker_id ASC"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map([format!("{prefix}-%")], map_joined)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Every attendance record, in snapshot order.
pub fn list_attendance(conn: &Connection) -> AppResult<Vec<AttendanceRecord>> {
    let mut stmt = conn.prepare_cached(
        "SELECT date, worker_id, am_owner_id, pm_owner_id, am, pm
         FROM logs ORDER BY date ASC, worker_id ASC",
    )?;
    let rows = stmt.query_map([], map_attendance)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn map_attendance(row: &Row) -> Result<AttendanceRecord> {
    let date_str: String = row.get(0)?;

    let date = NaiveDate::parse_from_str(&date_str, DATE_FMT).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidDate(date_str.clone())),
        )
    })?;

    Ok(AttendanceRecord {
        date,
        worker_id: row.get(1)?,
        am_owner_id: row.get(2)?,
        pm_owner_id: row.get(3)?,
        am_present: row.get::<_, Option<i64>>(4)?.unwrap_or(0) != 0,
        pm_present: row.get::<_, Option<i64>>(5)?.unwrap_or(0) != 0,
    })
}

fn map_joined(row: &Row) -> Result<JoinedRecord> {
    Ok(JoinedRecord {
        record: map_attendance(row)?,
        worker_name: row.get(6)?,
        daily_rate: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;

    fn ledger() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        conn
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FMT).unwrap()
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let conn = ledger();
        let a = create_worker(&conn, "Zhang", 200.0).unwrap();
        assert!(delete_worker(&conn, a).unwrap());
        let b = create_worker(&conn, "Li", 180.0).unwrap();
        assert!(b > a);
    }

    #[test]
    fn upsert_twice_is_idempotent() {
        let conn = ledger();
        let w = create_worker(&conn, "Zhang", 200.0).unwrap();
        let o = create_owner(&conn, "Chen").unwrap();

        let mut rec = AttendanceRecord::empty(d("2025-03-04"), w);
        rec.am_owner_id = Some(o);
        rec.am_present = true;

        upsert_attendance(&conn, &rec).unwrap();
        let once = list_attendance(&conn).unwrap();
        upsert_attendance(&conn, &rec).unwrap();
        let twice = list_attendance(&conn).unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
        assert_eq!(get_attendance(&conn, &d("2025-03-04"), w).unwrap(), Some(rec));
    }

    #[test]
    fn month_query_is_a_prefix_match() {
        let conn = ledger();
        let w = create_worker(&conn, "Zhang", 200.0).unwrap();
        for day in ["2025-02-28", "2025-03-01", "2025-03-31", "2025-04-01"] {
            upsert_attendance(&conn, &AttendanceRecord::empty(d(day), w)).unwrap();
        }

        let march = query_attendance_month(&conn, "2025-03").unwrap();
        let dates: Vec<String> = march.iter().map(|j| j.record.date_str()).collect();
        assert_eq!(dates, vec!["2025-03-01", "2025-03-31"]);
        assert_eq!(march[0].worker_name.as_deref(), Some("Zhang"));
        assert_eq!(march[0].daily_rate, Some(200.0));
    }

    #[test]
    fn month_query_rejects_bad_prefix() {
        let conn = ledger();
        assert!(matches!(
            query_attendance_month(&conn, "2025-3"),
            Err(AppError::InvalidDate(_))
        ));
    }

    #[test]
    fn deleted_worker_keeps_records_without_name() {
        let conn = ledger();
        let w = create_worker(&conn, "Zhang", 200.0).unwrap();
        upsert_attendance(&conn, &AttendanceRecord::empty(d("2025-03-04"), w)).unwrap();
        delete_worker(&conn, w).unwrap();

        let rows = query_attendance_range(&conn, &d("2025-03-01"), &d("2025-03-31")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].worker_name, None);
        assert_eq!(rows[0].daily_rate, None);
    }
}
