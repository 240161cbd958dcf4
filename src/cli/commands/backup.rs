use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::backup::BackupLogic;
use crate::core::notify::{NotificationChannel, NotifyLogic, OutboxChannel};
use crate::db::initialize::open_ledger;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};
use crate::utils::date;
use std::sync::Arc;

/// Handles `backup`, `restore` and `send-backup`.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    match cmd {
        Commands::Backup {
            file,
            compress,
            force,
        } => {
            let mut pool = open_ledger(&cfg.database)?;
            let written = BackupLogic::backup(&mut pool, file, *compress, *force)?;
            success(format!("Backup written to {}", written.display()));
        }

        Commands::Restore { file } => {
            let mut pool = open_ledger(&cfg.database)?;
            let summary = BackupLogic::restore(&mut pool, file)?;
            success(format!(
                "Restored {} workers, {} owners, {} attendance records",
                summary.workers, summary.owners, summary.logs
            ));
        }

        Commands::SendBackup { to, auto } => {
            let destination = to
                .clone()
                .or_else(|| cfg.backup_destination.clone())
                .ok_or_else(|| {
                    AppError::Validation(
                        "no destination: pass --to or set backup_destination".into(),
                    )
                })?;
            send(cfg, &destination, *auto)?;
        }

        _ => {}
    }

    Ok(())
}

fn channel(cfg: &Config) -> Arc<dyn NotificationChannel> {
    Arc::new(OutboxChannel::new(&cfg.outbox_dir))
}

fn send(cfg: &Config, destination: &str, automatic: bool) -> AppResult<()> {
    let pool = open_ledger(&cfg.database)?;
    let today = date::today();

    if automatic {
        match NotifyLogic::run_auto_backup(&pool.conn, channel(cfg), destination, today)? {
            None => info("Automatic backup already sent today"),
            Some(outcome) if outcome.success => success(outcome.message),
            Some(outcome) => return Err(AppError::Other(outcome.message)),
        }
        return Ok(());
    }

    let pending = NotifyLogic::dispatch(&pool.conn, channel(cfg), destination, false)?;
    info(format!("Sending backup to {destination}…"));
    let outcome = pending.wait();
    NotifyLogic::settle(&pool.conn, &outcome, false, today)?;

    if outcome.success {
        success(outcome.message);
        Ok(())
    } else {
        Err(AppError::Other(outcome.message))
    }
}

/// Daily automatic backup, run after a command changed the ledger.
/// A failed send only warns: the change itself already succeeded.
pub fn auto_backup_after_change(cfg: &Config) {
    if !cfg.auto_backup {
        return;
    }
    let Some(destination) = cfg.backup_destination.as_deref() else {
        return;
    };

    let result = open_ledger(&cfg.database).and_then(|pool| {
        NotifyLogic::run_auto_backup(&pool.conn, channel(cfg), destination, date::today())
    });

    match result {
        Ok(Some(outcome)) if outcome.success => {
            info(format!("Automatic backup: {}", outcome.message))
        }
        Ok(Some(outcome)) => warning(format!("Automatic backup failed: {}", outcome.message)),
        Ok(None) => {}
        Err(e) => warning(format!("Automatic backup failed: {e}")),
    }
}
