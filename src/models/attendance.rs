use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;

/// One of the two billable halves of a working day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
pub enum HalfShift {
    Am,
    Pm,
}

impl HalfShift {
    pub fn label(&self) -> &'static str {
        match self {
            HalfShift::Am => "AM",
            HalfShift::Pm => "PM",
        }
    }
}

/// One row of the `logs` table, keyed by (date, worker_id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    pub date: NaiveDate,            // ⇔ logs.date (TEXT "YYYY-MM-DD")
    pub worker_id: i64,             // ⇔ logs.worker_id
    pub am_owner_id: Option<i64>,   // ⇔ logs.am_owner_id
    pub pm_owner_id: Option<i64>,   // ⇔ logs.pm_owner_id
    pub am_present: bool,           // ⇔ logs.am (0/1)
    pub pm_present: bool,           // ⇔ logs.pm (0/1)
}

impl AttendanceRecord {
    /// A record with no owners and no presence ("no activity that day").
    pub fn empty(date: NaiveDate, worker_id: i64) -> Self {
        Self {
            date,
            worker_id,
            am_owner_id: None,
            pm_owner_id: None,
            am_present: false,
            pm_present: false,
        }
    }

    pub fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn owner(&self, half: HalfShift) -> Option<i64> {
        match half {
            HalfShift::Am => self.am_owner_id,
            HalfShift::Pm => self.pm_owner_id,
        }
    }

    pub fn present(&self, half: HalfShift) -> bool {
        match half {
            HalfShift::Am => self.am_present,
            HalfShift::Pm => self.pm_present,
        }
    }

    pub fn set_owner(&mut self, half: HalfShift, owner_id: Option<i64>) {
        match half {
            HalfShift::Am => self.am_owner_id = owner_id,
            HalfShift::Pm => self.pm_owner_id = owner_id,
        }
    }

    pub fn set_present(&mut self, half: HalfShift, present: bool) {
        match half {
            HalfShift::Am => self.am_present = present,
            HalfShift::Pm => self.pm_present = present,
        }
    }

    /// Days worked on this record: 0, 0.5 or 1.
    pub fn days_worked(&self) -> f64 {
        let am = if self.am_present { 0.5 } else { 0.0 };
        let pm = if self.pm_present { 0.5 } else { 0.0 };
        am + pm
    }
}

/// Attendance row joined at read time with its worker.
///
/// `worker_name` / `daily_rate` are `None` when the worker was deleted
/// after the record was written.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRecord {
    pub record: AttendanceRecord,
    pub worker_name: Option<String>,
    pub daily_rate: Option<f64>,
}
