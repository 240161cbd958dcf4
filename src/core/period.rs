//! Billing periods: the solar or lunar month that contains a reference date.

use crate::core::calendar;
use crate::db::queries;
use crate::errors::AppResult;
use crate::models::{CalendarMode, JoinedRecord};
use chrono::{Datelike, Duration, NaiveDate};
use rusqlite::Connection;

/// Identity of a billing period. Two dates belong to the same period iff
/// they resolve to equal keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodKey {
    Solar { year: i32, month: u32 },
    Lunar { year: i32, month: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingPeriod {
    pub key: PeriodKey,
    /// First solar day of the period (inclusive).
    pub start: NaiveDate,
    /// Last solar day of the period (inclusive).
    pub end: NaiveDate,
    /// Present for lunar periods whose month is repeated as a leap month.
    pub has_leap: bool,
}

impl BillingPeriod {
    /// Period of `mode` containing `reference`.
    ///
    /// Lunar mode fails with `CalendarOutOfRange` outside the lunar table.
    pub fn resolve(reference: NaiveDate, mode: CalendarMode) -> AppResult<Self> {
        match mode {
            CalendarMode::Solar => Ok(Self::solar(reference.year(), reference.month())),
            CalendarMode::Lunar => {
                let lunar = calendar::to_lunar(reference)?;
                Self::lunar(lunar.year, lunar.month)
            }
        }
    }

    fn solar(year: i32, month: u32) -> Self {
        let start = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default();
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .unwrap_or(start);

        Self {
            key: PeriodKey::Solar { year, month },
            start,
            end: next - Duration::days(1),
            has_leap: false,
        }
    }

    fn lunar(year: i32, month: u32) -> AppResult<Self> {
        let (start, end) = calendar::lunar_month_span(year, month)?;
        let first = calendar::to_lunar(start)?;
        let last = calendar::to_lunar(end)?;
        Ok(Self {
            key: PeriodKey::Lunar { year, month },
            start,
            end,
            has_leap: first.leap != last.leap,
        })
    }

    pub fn mode(&self) -> CalendarMode {
        match self.key {
            PeriodKey::Solar { .. } => CalendarMode::Solar,
            PeriodKey::Lunar { .. } => CalendarMode::Lunar,
        }
    }

    /// Whether `date` falls inside this period.
    pub fn contains(&self, date: NaiveDate) -> bool {
        match self.key {
            PeriodKey::Solar { year, month } => date.year() == year && date.month() == month,
            PeriodKey::Lunar { year, month } => calendar::to_lunar(date)
                .map(|l| l.year_month() == (year, month))
                .unwrap_or(false),
        }
    }

    /// "2025-03 solar" / "2025年2月", or "2023年2月 (含闰月)" when the
    /// lunar month has a leap twin.
    pub fn label(&self) -> String {
        match self.key {
            PeriodKey::Solar { year, month } => format!("{year}-{month:02} solar"),
            PeriodKey::Lunar { year, month } => {
                let leap = if self.has_leap { " (含闰月)" } else { "" };
                format!("{year}年{month}月{leap}")
            }
        }
    }

    pub fn previous(&self) -> AppResult<Self> {
        Self::resolve(self.start - Duration::days(1), self.mode())
    }

    pub fn next(&self) -> AppResult<Self> {
        Self::resolve(self.end + Duration::days(1), self.mode())
    }

    /// Load every attendance record of this period, ordered by date then
    /// worker id.
    ///
    /// Solar periods use the `YYYY-MM` prefix query. Lunar periods fetch
    /// the exact solar span of the lunar month and keep only rows whose
    /// own date converts to the same lunar (year, month).
    pub fn load_records(&self, conn: &Connection) -> AppResult<Vec<JoinedRecord>> {
        match self.key {
            PeriodKey::Solar { year, month } => {
                queries::query_attendance_month(conn, &format!("{year:04}-{month:02}"))
            }
            PeriodKey::Lunar { .. } => {
                let rows = queries::query_attendance_range(conn, &self.start, &self.end)?;
                Ok(rows
                    .into_iter()
                    .filter(|j| self.contains(j.record.date))
                    .collect())
            }
        }
    }
}

/// Display form of a record date in the given mode.
pub fn display_date(date: NaiveDate, mode: CalendarMode) -> String {
    match mode {
        CalendarMode::Solar => date.format("%Y-%m-%d").to_string(),
        CalendarMode::Lunar => calendar::lunar_label(date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn solar_period_is_the_calendar_month() {
        let p = BillingPeriod::resolve(d(2024, 2, 14), CalendarMode::Solar).unwrap();
        assert_eq!(p.start, d(2024, 2, 1));
        assert_eq!(p.end, d(2024, 2, 29));
        assert_eq!(p.label(), "2024-02 solar");
        assert!(p.contains(d(2024, 2, 29)));
        assert!(!p.contains(d(2024, 3, 1)));

        let dec = BillingPeriod::resolve(d(2024, 12, 31), CalendarMode::Solar).unwrap();
        assert_eq!(dec.end, d(2024, 12, 31));
        assert_eq!(dec.next().unwrap().start, d(2025, 1, 1));
    }

    #[test]
    fn lunar_period_uses_exact_boundaries() {
        let p = BillingPeriod::resolve(d(2024, 3, 1), CalendarMode::Lunar).unwrap();
        assert_eq!(p.key, PeriodKey::Lunar { year: 2024, month: 1 });
        assert_eq!((p.start, p.end), (d(2024, 2, 10), d(2024, 3, 9)));
        assert_eq!(p.label(), "2024年1月");
        assert!(p.contains(d(2024, 2, 10)));
        assert!(!p.contains(d(2024, 3, 10)));
        assert!(!p.contains(d(2024, 2, 9)));

        assert_eq!(p.previous().unwrap().key, PeriodKey::Lunar { year: 2023, month: 12 });
        assert_eq!(p.next().unwrap().key, PeriodKey::Lunar { year: 2024, month: 2 });
    }

    #[test]
    fn lunar_period_with_leap_twin() {
        let from_regular = BillingPeriod::resolve(d(2023, 3, 1), CalendarMode::Lunar).unwrap();
        let from_leap = BillingPeriod::resolve(d(2023, 4, 10), CalendarMode::Lunar).unwrap();
        assert_eq!(from_regular, from_leap);
        assert!(from_regular.has_leap);
        assert_eq!(from_regular.end, d(2023, 4, 19));
    }

    #[test]
    fn lunar_mode_out_of_range() {
        assert!(BillingPeriod::resolve(d(1899, 5, 1), CalendarMode::Lunar).is_err());
        assert!(BillingPeriod::resolve(d(1899, 5, 1), CalendarMode::Solar).is_ok());
    }

    #[test]
    fn display_dates() {
        assert_eq!(display_date(d(2024, 2, 24), CalendarMode::Solar), "2024-02-24");
        assert_eq!(display_date(d(2024, 2, 24), CalendarMode::Lunar), "正月十五");
    }
}
