//! Internal operation journal (`journal` table).
//!
//! Every ledger mutation leaves one line here. The journal is not part of
//! a snapshot and survives a restore.

use crate::errors::AppResult;
use crate::ui::messages::warning;
use chrono::Local;
use rusqlite::{Connection, params};

#[derive(Debug, Clone)]
pub struct JournalEntry {
    pub id: i64,
    pub date: String,
    pub operation: String,
    pub target: String,
    pub message: String,
}

/// Write an internal journal line.
pub fn record(conn: &Connection, operation: &str, target: &str, message: &str) -> AppResult<()> {
    let now = Local::now().to_rfc3339();

    let mut stmt = conn.prepare_cached(
        "INSERT INTO journal (date, operation, target, message)
         VALUES (?1, ?2, ?3, ?4)",
    )?;

    stmt.execute(params![now, operation, target, message])?;

    Ok(())
}

/// Like [`record`], but a failure only prints a warning: the operation
/// being described has already succeeded.
pub fn record_quietly(conn: &Connection, operation: &str, target: &str, message: &str) {
    if let Err(e) = record(conn, operation, target, message) {
        warning(format!("Failed to write internal journal: {}", e));
    }
}

pub fn load_journal(conn: &Connection) -> AppResult<Vec<JournalEntry>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, date, operation, target, message FROM journal ORDER BY id ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(JournalEntry {
            id: row.get(0)?,
            date: row.get(1)?,
            operation: row.get(2)?,
            target: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            message: row.get(4)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
