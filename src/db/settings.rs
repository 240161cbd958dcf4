//! Small key/value state that must survive between sessions.

use crate::errors::AppResult;
use rusqlite::{Connection, OptionalExtension, params};

/// Date (YYYY-MM-DD) of the last successful automatic backup send.
pub const LAST_AUTO_BACKUP: &str = "last_auto_backup";

pub fn get_setting(conn: &Connection, key: &str) -> AppResult<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM settings WHERE key = ?1",
            [key],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(value)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> AppResult<()> {
    conn.execute(
        "INSERT INTO settings (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}
