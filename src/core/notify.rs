//! Sending the backup payload through a notification channel.
//!
//! The send runs on its own thread with a payload built beforehand, so
//! it never holds the ledger while the channel works. Only a successful
//! automatic send is written back (as today's `last_auto_backup`).

use crate::core::snapshot::SnapshotLogic;
use crate::db::journal::record_quietly;
use crate::db::settings::{LAST_AUTO_BACKUP, get_setting, set_setting};
use crate::errors::AppResult;
use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub success: bool,
    pub message: String,
}

impl SendOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Transport for the serialized snapshot (mail, chat, spool directory...).
pub trait NotificationChannel: Send + Sync {
    fn send(&self, payload: &str, destination: &str, is_automatic: bool) -> SendOutcome;
}

/// Spools each payload as a file in a directory, for a mailer or sync
/// tool to pick up.
pub struct OutboxChannel {
    dir: PathBuf,
}

impl OutboxChannel {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

fn file_safe(destination: &str) -> String {
    destination
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' { c } else { '_' })
        .collect()
}

impl NotificationChannel for OutboxChannel {
    fn send(&self, payload: &str, destination: &str, is_automatic: bool) -> SendOutcome {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            return SendOutcome::failed(format!("cannot create outbox: {e}"));
        }

        let name = format!(
            "{}_{}_{}.json",
            Local::now().format("%Y%m%d_%H%M%S%.3f"),
            if is_automatic { "auto" } else { "manual" },
            file_safe(destination)
        );
        let path = self.dir.join(name);

        match fs::write(&path, payload) {
            Ok(()) => SendOutcome::ok(format!("queued for {destination}: {}", path.display())),
            Err(e) => SendOutcome::failed(format!("cannot write {}: {e}", path.display())),
        }
    }
}

/// A send running in the background.
pub struct PendingSend {
    handle: JoinHandle<SendOutcome>,
    pub automatic: bool,
}

impl PendingSend {
    /// Block until the channel reports back. A panicking channel counts
    /// as a failed send.
    pub fn wait(self) -> SendOutcome {
        self.handle
            .join()
            .unwrap_or_else(|_| SendOutcome::failed("notification channel panicked"))
    }
}

pub struct NotifyLogic;

impl NotifyLogic {
    /// No automatic send has succeeded yet today.
    pub fn auto_backup_due(conn: &Connection, today: NaiveDate) -> AppResult<bool> {
        let last = get_setting(conn, LAST_AUTO_BACKUP)?;
        Ok(last.as_deref() != Some(today.format("%Y-%m-%d").to_string().as_str()))
    }

    /// Build the payload now and hand it to `channel` on a new thread.
    pub fn dispatch(
        conn: &Connection,
        channel: Arc<dyn NotificationChannel>,
        destination: &str,
        automatic: bool,
    ) -> AppResult<PendingSend> {
        let payload = SnapshotLogic::export(conn)?.to_text()?;
        let destination = destination.to_string();

        let handle = thread::spawn(move || channel.send(&payload, &destination, automatic));

        Ok(PendingSend { handle, automatic })
    }

    /// Record the result of a finished send.
    pub fn settle(
        conn: &Connection,
        outcome: &SendOutcome,
        automatic: bool,
        today: NaiveDate,
    ) -> AppResult<()> {
        if outcome.success && automatic {
            set_setting(conn, LAST_AUTO_BACKUP, &today.format("%Y-%m-%d").to_string())?;
        }

        record_quietly(
            conn,
            "send_backup",
            if automatic { "auto" } else { "manual" },
            &format!(
                "{}: {}",
                if outcome.success { "ok" } else { "failed" },
                outcome.message
            ),
        );
        Ok(())
    }

    /// Send today's automatic backup unless one already went out.
    ///
    /// Returns `None` when nothing was due.
    pub fn run_auto_backup(
        conn: &Connection,
        channel: Arc<dyn NotificationChannel>,
        destination: &str,
        today: NaiveDate,
    ) -> AppResult<Option<SendOutcome>> {
        if !Self::auto_backup_due(conn, today)? {
            return Ok(None);
        }

        let pending = Self::dispatch(conn, channel, destination, true)?;
        let outcome = pending.wait();
        Self::settle(conn, &outcome, true, today)?;
        Ok(Some(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<(String, String, bool)>>,
        fail: bool,
    }

    impl NotificationChannel for Recorder {
        fn send(&self, payload: &str, destination: &str, is_automatic: bool) -> SendOutcome {
            self.sent
                .lock()
                .unwrap()
                .push((payload.to_string(), destination.to_string(), is_automatic));
            if self.fail {
                SendOutcome::failed("smtp down")
            } else {
                SendOutcome::ok("sent")
            }
        }
    }

    fn ledger() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        conn
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn automatic_send_happens_once_per_day() {
        let conn = ledger();
        let channel = Arc::new(Recorder::default());

        let first =
            NotifyLogic::run_auto_backup(&conn, channel.clone(), "boss@example.com", day("2025-03-04"))
                .unwrap();
        assert_eq!(first, Some(SendOutcome::ok("sent")));

        let again =
            NotifyLogic::run_auto_backup(&conn, channel.clone(), "boss@example.com", day("2025-03-04"))
                .unwrap();
        assert_eq!(again, None);

        let next_day =
            NotifyLogic::run_auto_backup(&conn, channel.clone(), "boss@example.com", day("2025-03-05"))
                .unwrap();
        assert!(next_day.is_some());

        let sent = channel.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].0.starts_with(r#"{"workers":[]"#));
        assert!(sent[0].2);
    }

    #[test]
    fn failed_send_is_retried_later_the_same_day() {
        let conn = ledger();
        let failing = Arc::new(Recorder {
            fail: true,
            ..Default::default()
        });

        let outcome =
            NotifyLogic::run_auto_backup(&conn, failing, "boss@example.com", day("2025-03-04"))
                .unwrap();
        assert_eq!(outcome.map(|o| o.success), Some(false));
        assert!(NotifyLogic::auto_backup_due(&conn, day("2025-03-04")).unwrap());
    }

    #[test]
    fn manual_send_does_not_mark_the_day() {
        let conn = ledger();
        let channel = Arc::new(Recorder::default());

        let pending = NotifyLogic::dispatch(&conn, channel, "boss@example.com", false).unwrap();
        let outcome = pending.wait();
        NotifyLogic::settle(&conn, &outcome, false, day("2025-03-04")).unwrap();

        assert!(outcome.success);
        assert!(NotifyLogic::auto_backup_due(&conn, day("2025-03-04")).unwrap());
    }

    #[test]
    fn outbox_spools_payload() {
        let dir = std::env::temp_dir().join(format!("rshiftbook_outbox_{}", std::process::id()));
        fs::remove_dir_all(&dir).ok();

        let outcome = OutboxChannel::new(&dir).send("{}", "boss@example.com", true);
        assert!(outcome.success, "{}", outcome.message);

        let files: Vec<_> = fs::read_dir(&dir).unwrap().collect();
        assert_eq!(files.len(), 1);
        let path = files[0].as_ref().unwrap().path();
        assert!(path.to_string_lossy().ends_with("_auto_boss_example.com.json"));
        assert_eq!(fs::read_to_string(path).unwrap(), "{}");

        fs::remove_dir_all(&dir).ok();
    }
}
