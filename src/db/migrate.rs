use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `journal` table exists. Migrations record themselves
/// there, so it has to come first.
fn ensure_journal_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS journal (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn migration_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM journal
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO journal (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

/// The three ledger collections. Column order is the snapshot row order.
///
/// Compatible with ledgers created by earlier releases, which used the
/// same table names without NOT NULL constraints.
fn create_ledger_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS workers (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            daily_rate  REAL NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS owners (
            id    INTEGER PRIMARY KEY AUTOINCREMENT,
            name  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS logs (
            date         TEXT NOT NULL,
            worker_id    INTEGER NOT NULL,
            am_owner_id  INTEGER,
            pm_owner_id  INTEGER,
            am           INTEGER NOT NULL DEFAULT 0,
            pm           INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (date, worker_id)
        );
        "#,
    )?;
    Ok(())
}

fn create_settings_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key    TEXT PRIMARY KEY,
            value  TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn add_logs_worker_index(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE INDEX IF NOT EXISTS idx_logs_worker_date ON logs(worker_id, date);")?;
    Ok(())
}

type Migration = (&'static str, &'static str, fn(&Connection) -> Result<()>);

const MIGRATIONS: &[Migration] = &[
    (
        "20250301_0001_create_ledger_tables",
        "Created workers, owners and logs tables",
        create_ledger_tables,
    ),
    (
        "20250301_0002_create_settings",
        "Created settings table",
        create_settings_table,
    ),
    (
        "20250412_0003_logs_worker_index",
        "Added (worker_id, date) index on logs",
        add_logs_worker_index,
    ),
];

/// Public entry point: run all pending migrations.
///
/// Invocata da db::initialize::init_db().
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_journal_table(conn)?;

    for (version, message, apply) in MIGRATIONS {
        if migration_applied(conn, version)? {
            continue;
        }

        apply(conn)?;
        mark_applied(conn, version, message)?;
        success(format!("Migration applied: {} → {}", version, message));
    }

    Ok(())
}
