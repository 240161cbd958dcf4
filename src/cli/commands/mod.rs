pub mod attendance;
pub mod backup;
pub mod config;
pub mod day;
pub mod db;
pub mod detail;
pub mod init;
pub mod journal;
pub mod report;
pub mod roster;

use crate::config::Config;
use crate::models::CalendarMode;
use crate::utils::fmt_amount;

/// `--solar` / `--lunar` win over the configured default.
pub fn calendar_mode(solar: bool, lunar: bool, cfg: &Config) -> CalendarMode {
    if solar {
        CalendarMode::Solar
    } else if lunar {
        CalendarMode::Lunar
    } else {
        CalendarMode::from_lunar_flag(cfg.lunar_mode)
    }
}

/// Amount with the configured currency suffix ("300元").
pub fn money(value: f64, cfg: &Config) -> String {
    format!("{}{}", fmt_amount(value), cfg.currency_suffix)
}
