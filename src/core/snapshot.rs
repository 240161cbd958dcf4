//! Full-state snapshot of the ledger and its atomic restore.
//!
//! Wire format (JSON):
//!
//! ```text
//! {"workers": [[id, name, daily_rate], ...],
//!  "owners":  [[id, name], ...],
//!  "logs":    [["YYYY-MM-DD", worker_id, am_owner_id|null, pm_owner_id|null, am 0/1, pm 0/1], ...]}
//! ```

use crate::db::journal::record_quietly;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::{AttendanceRecord, Owner, Worker};
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type WorkerRow = (i64, String, f64);
pub type OwnerRow = (i64, String);
pub type LogRow = (String, i64, Option<i64>, Option<i64>, i64, i64);

const KEYS: [&str; 3] = ["workers", "owners", "logs"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    pub workers: Vec<WorkerRow>,
    pub owners: Vec<OwnerRow>,
    pub logs: Vec<LogRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub workers: usize,
    pub owners: usize,
    pub logs: usize,
}

impl Snapshot {
    /// Parse snapshot text. Anything that is not a JSON object carrying
    /// the three arrays with well-formed rows is `MalformedSnapshot`.
    pub fn parse(text: &str) -> AppResult<Self> {
        let value: Value = serde_json::from_str(text.trim())?;

        let Some(map) = value.as_object() else {
            return Err(AppError::MalformedSnapshot(
                "top level must be an object".into(),
            ));
        };
        for key in KEYS {
            match map.get(key) {
                Some(Value::Array(_)) => {}
                Some(_) => {
                    return Err(AppError::MalformedSnapshot(format!(
                        "'{key}' must be an array"
                    )));
                }
                None => {
                    return Err(AppError::MalformedSnapshot(format!(
                        "missing '{key}'"
                    )));
                }
            }
        }
        if let Some(extra) = map.keys().find(|k| !KEYS.contains(&k.as_str())) {
            return Err(AppError::MalformedSnapshot(format!(
                "unexpected field '{extra}'"
            )));
        }

        Ok(serde_json::from_value(value)?)
    }

    pub fn to_text(&self) -> AppResult<String> {
        serde_json::to_string(self).map_err(|e| AppError::Export(e.to_string()))
    }

    pub fn from_ledger(conn: &Connection) -> AppResult<Self> {
        let workers = queries::list_workers(conn)?
            .into_iter()
            .map(|w| (w.id, w.name, w.daily_rate))
            .collect();
        let owners = queries::list_owners(conn)?
            .into_iter()
            .map(|o| (o.id, o.name))
            .collect();
        let logs = queries::list_attendance(conn)?
            .into_iter()
            .map(|r| {
                (
                    r.date_str(),
                    r.worker_id,
                    r.am_owner_id,
                    r.pm_owner_id,
                    r.am_present as i64,
                    r.pm_present as i64,
                )
            })
            .collect();

        Ok(Self {
            workers,
            owners,
            logs,
        })
    }

    /// Convert rows into domain values, rejecting anything out of shape.
    fn validate(&self) -> AppResult<(Vec<Worker>, Vec<Owner>, Vec<AttendanceRecord>)> {
        let mut workers = Vec::with_capacity(self.workers.len());
        for (i, (id, name, rate)) in self.workers.iter().enumerate() {
            if !rate.is_finite() || *rate < 0.0 {
                return Err(AppError::MalformedSnapshot(format!(
                    "workers[{i}]: invalid daily rate {rate}"
                )));
            }
            workers.push(Worker {
                id: *id,
                name: name.clone(),
                daily_rate: *rate,
            });
        }

        let owners = self
            .owners
            .iter()
            .map(|(id, name)| Owner {
                id: *id,
                name: name.clone(),
            })
            .collect();

        let flag = |i: usize, v: i64| match v {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(AppError::MalformedSnapshot(format!(
                "logs[{i}]: presence flag must be 0 or 1, got {other}"
            ))),
        };

        let mut logs = Vec::with_capacity(self.logs.len());
        for (i, (date, worker_id, am_owner, pm_owner, am, pm)) in self.logs.iter().enumerate() {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
                AppError::MalformedSnapshot(format!("logs[{i}]: invalid date '{date}'"))
            })?;
            logs.push(AttendanceRecord {
                date,
                worker_id: *worker_id,
                am_owner_id: *am_owner,
                pm_owner_id: *pm_owner,
                am_present: flag(i, *am)?,
                pm_present: flag(i, *pm)?,
            });
        }

        Ok((workers, owners, logs))
    }
}

pub struct SnapshotLogic;

impl SnapshotLogic {
    pub fn export(conn: &Connection) -> AppResult<Snapshot> {
        Snapshot::from_ledger(conn)
    }

    /// Replace workers, owners and logs with the snapshot content.
    ///
    /// Runs as a single write transaction: on any failure the ledger is
    /// exactly as it was before the call.
    pub fn import(pool: &mut DbPool, snapshot: &Snapshot) -> AppResult<ImportSummary> {
        let (workers, owners, logs) = snapshot.validate()?;

        let tx = pool.write_tx()?;

        tx.execute_batch(
            "DELETE FROM logs;
             DELETE FROM workers;
             DELETE FROM owners;
             DELETE FROM sqlite_sequence WHERE name IN ('workers', 'owners');",
        )?;

        for (i, w) in workers.iter().enumerate() {
            tx.execute(
                "INSERT INTO workers (id, name, daily_rate) VALUES (?1, ?2, ?3)",
                params![w.id, w.name, w.daily_rate],
            )
            .map_err(|e| AppError::MalformedSnapshot(format!("workers[{i}]: {e}")))?;
        }

        for (i, o) in owners.iter().enumerate() {
            tx.execute(
                "INSERT INTO owners (id, name) VALUES (?1, ?2)",
                params![o.id, o.name],
            )
            .map_err(|e| AppError::MalformedSnapshot(format!("owners[{i}]: {e}")))?;
        }

        for (i, r) in logs.iter().enumerate() {
            tx.execute(
                "INSERT INTO logs (date, worker_id, am_owner_id, pm_owner_id, am, pm)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    r.date_str(),
                    r.worker_id,
                    r.am_owner_id,
                    r.pm_owner_id,
                    r.am_present as i64,
                    r.pm_present as i64,
                ],
            )
            .map_err(|e| AppError::MalformedSnapshot(format!("logs[{i}]: {e}")))?;
        }

        // ids still referenced by logs stay reserved
        tx.execute_batch(
            "DELETE FROM sqlite_sequence WHERE name IN ('workers', 'owners');
             INSERT INTO sqlite_sequence (name, seq) VALUES
               ('workers', (SELECT MAX(
                    COALESCE((SELECT MAX(id) FROM workers), 0),
                    COALESCE((SELECT MAX(worker_id) FROM logs), 0)))),
               ('owners', (SELECT MAX(
                    COALESCE((SELECT MAX(id) FROM owners), 0),
                    COALESCE((SELECT MAX(am_owner_id) FROM logs), 0),
                    COALESCE((SELECT MAX(pm_owner_id) FROM logs), 0))));",
        )?;

        tx.commit()?;

        let summary = ImportSummary {
            workers: workers.len(),
            owners: owners.len(),
            logs: logs.len(),
        };
        record_quietly(
            &pool.conn,
            "restore",
            "snapshot",
            &format!(
                "Restored {} workers, {} owners, {} attendance records",
                summary.workers, summary.owners, summary.logs
            ),
        );

        Ok(summary)
    }

    pub fn import_text(pool: &mut DbPool, text: &str) -> AppResult<ImportSummary> {
        let snapshot = Snapshot::parse(text)?;
        Self::import(pool, &snapshot)
    }
}
