//! Solar (Gregorian) ⇄ Chinese lunar calendar conversion.
//!
//! Table driven, valid from 1900-01-31 (lunar 1900-01-01) to 2101-01-28
//! (lunar 2100-12-29). Each `LUNAR_INFO` entry packs one lunar year:
//! - bits 0..4   leap month number (0 = no leap month)
//! - bits 4..16  size of months 12..1 (bit set = 30 days, else 29)
//! - bit 16      size of the leap month (set = 30 days)

use crate::errors::{AppError, AppResult};
use chrono::{Duration, NaiveDate};
use serde::Serialize;

const FIRST_YEAR: i32 = 1900;
const LAST_YEAR: i32 = 2100;

#[rustfmt::skip]
const LUNAR_INFO: [u32; 201] = [
    0x04bd8, 0x04ae0, 0x0a570, 0x054d5, 0x0d260, 0x0d950, 0x16554, 0x056a0, 0x09ad0, 0x055d2, // 1900
    0x04ae0, 0x0a5b6, 0x0a4d0, 0x0d250, 0x1d255, 0x0b540, 0x0d6a0, 0x0ada2, 0x095b0, 0x14977, // 1910
    0x04970, 0x0a4b0, 0x0b4b5, 0x06a50, 0x06d40, 0x1ab54, 0x02b60, 0x09570, 0x052f2, 0x04970, // 1920
    0x06566, 0x0d4a0, 0x0ea50, 0x16a95, 0x05ad0, 0x02b60, 0x186e3, 0x092e0, 0x1c8d7, 0x0c950, // 1930
    0x0d4a0, 0x1d8a6, 0x0b550, 0x056a0, 0x1a5b4, 0x025d0, 0x092d0, 0x0d2b2, 0x0a950, 0x0b557, // 1940
    0x06ca0, 0x0b550, 0x15355, 0x04da0, 0x0a5b0, 0x14573, 0x052b0, 0x0a9a8, 0x0e950, 0x06aa0, // 1950
    0x0aea6, 0x0ab50, 0x04b60, 0x0aae4, 0x0a570, 0x05260, 0x0f263, 0x0d950, 0x05b57, 0x056a0, // 1960
    0x096d0, 0x04dd5, 0x04ad0, 0x0a4d0, 0x0d4d4, 0x0d250, 0x0d558, 0x0b540, 0x0b6a0, 0x195a6, // 1970
    0x095b0, 0x049b0, 0x0a974, 0x0a4b0, 0x0b27a, 0x06a50, 0x06d40, 0x0af46, 0x0ab60, 0x09570, // 1980
    0x04af5, 0x04970, 0x064b0, 0x074a3, 0x0ea50, 0x06b58, 0x05ac0, 0x0ab60, 0x096d5, 0x092e0, // 1990
    0x0c960, 0x0d954, 0x0d4a0, 0x0da50, 0x07552, 0x056a0, 0x0abb7, 0x025d0, 0x092d0, 0x0cab5, // 2000
    0x0a950, 0x0b4a0, 0x0baa4, 0x0ad50, 0x055d9, 0x04ba0, 0x0a5b0, 0x15176, 0x052b0, 0x0a930, // 2010
    0x07954, 0x06aa0, 0x0ad50, 0x05b52, 0x04b60, 0x0a6e6, 0x0a4e0, 0x0d260, 0x0ea65, 0x0d530, // 2020
    0x05aa0, 0x076a3, 0x096d0, 0x04afb, 0x04ad0, 0x0a4d0, 0x1d0b6, 0x0d250, 0x0d520, 0x0dd45, // 2030
    0x0b5a0, 0x056d0, 0x055b2, 0x049b0, 0x0a577, 0x0a4b0, 0x0aa50, 0x1b255, 0x06d20, 0x0ada0, // 2040
    0x14b63, 0x09370, 0x049f8, 0x04970, 0x064b0, 0x168a6, 0x0ea50, 0x06b20, 0x1a6c4, 0x0aae0, // 2050
    0x092e0, 0x0d2e3, 0x0c960, 0x0d557, 0x0d4a0, 0x0da50, 0x05d55, 0x056a0, 0x0a6d0, 0x055d4, // 2060
    0x052d0, 0x0a9b8, 0x0a950, 0x0b4a0, 0x0b6a6, 0x0ad50, 0x055a0, 0x0aba4, 0x0a5b0, 0x052b0, // 2070
    0x0b273, 0x06930, 0x07337, 0x06aa0, 0x0ad50, 0x14b55, 0x04b60, 0x0a570, 0x054e4, 0x0d160, // 2080
    0x0e968, 0x0d520, 0x0daa0, 0x16aa6, 0x056d0, 0x04ae0, 0x0a9d4, 0x0a2d0, 0x0d150, 0x0f252, // 2090
    0x0d520,                                                                                   // 2100
];

/// A date in the Chinese lunar calendar.
///
/// `leap` is informational only: billing periods compare (year, month)
/// and treat a leap month as part of the month it repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LunarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub leap: bool,
}

impl LunarDate {
    pub fn year_month(&self) -> (i32, u32) {
        (self.year, self.month)
    }
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 31).unwrap_or_default()
}

fn info(year: i32) -> u32 {
    LUNAR_INFO[(year - FIRST_YEAR) as usize]
}

fn leap_month(year: i32) -> u32 {
    info(year) & 0xf
}

fn month_days(year: i32, month: u32) -> u32 {
    if info(year) & (0x10000 >> month) != 0 { 30 } else { 29 }
}

fn leap_days(year: i32) -> u32 {
    if leap_month(year) == 0 {
        0
    } else if info(year) & 0x10000 != 0 {
        30
    } else {
        29
    }
}

/// Months of a lunar year in calendar order: (month, is_leap, days).
fn months_of(year: i32) -> Vec<(u32, bool, u32)> {
    let leap = leap_month(year);
    let mut out = Vec::with_capacity(13);
    for m in 1..=12 {
        out.push((m, false, month_days(year, m)));
        if m == leap {
            out.push((m, true, leap_days(year)));
        }
    }
    out
}

fn year_days(year: i32) -> i64 {
    months_of(year).iter().map(|(_, _, d)| *d as i64).sum()
}

/// Last solar date the table can convert.
pub fn last_supported_date() -> NaiveDate {
    let total: i64 = (FIRST_YEAR..=LAST_YEAR).map(year_days).sum();
    epoch() + Duration::days(total - 1)
}

/// Convert a solar date to its lunar date.
pub fn to_lunar(date: NaiveDate) -> AppResult<LunarDate> {
    let mut offset = (date - epoch()).num_days();
    if offset < 0 {
        return Err(AppError::CalendarOutOfRange(date));
    }

    let mut year = FIRST_YEAR;
    loop {
        if year > LAST_YEAR {
            return Err(AppError::CalendarOutOfRange(date));
        }
        let days = year_days(year);
        if offset < days {
            break;
        }
        offset -= days;
        year += 1;
    }

    for (month, leap, days) in months_of(year) {
        let days = days as i64;
        if offset < days {
            return Ok(LunarDate {
                year,
                month,
                day: offset as u32 + 1,
                leap,
            });
        }
        offset -= days;
    }

    // year_days() is the sum of months_of(), so the loop always returns
    Err(AppError::CalendarOutOfRange(date))
}

/// Convert a lunar (year, month, day) back to its solar date.
///
/// When `month` has a leap twin the regular (first) month is meant.
pub fn from_lunar(year: i32, month: u32, day: u32) -> AppResult<NaiveDate> {
    let invalid = || {
        AppError::InvalidDate(format!("lunar {year}-{month:02}-{day:02} does not exist"))
    };

    if !(FIRST_YEAR..=LAST_YEAR).contains(&year) || !(1..=12).contains(&month) {
        return Err(invalid());
    }

    let mut offset: i64 = (FIRST_YEAR..year).map(year_days).sum();
    for (m, leap, days) in months_of(year) {
        if m == month && !leap {
            if day == 0 || day > days {
                return Err(invalid());
            }
            offset += day as i64 - 1;
            return Ok(epoch() + Duration::days(offset));
        }
        offset += days as i64;
    }

    Err(invalid())
}

/// Inclusive solar span of lunar month `month` of `year`, including its
/// leap twin when the year repeats that month.
pub fn lunar_month_span(year: i32, month: u32) -> AppResult<(NaiveDate, NaiveDate)> {
    let start = from_lunar(year, month, 1)?;
    let mut days = month_days(year, month) as i64;
    if leap_month(year) == month {
        days += leap_days(year) as i64;
    }
    Ok((start, start + Duration::days(days - 1)))
}

const MONTH_NAMES: [&str; 12] = [
    "正", "二", "三", "四", "五", "六", "七", "八", "九", "十", "冬", "腊",
];

const DIGITS: [&str; 10] = ["", "一", "二", "三", "四", "五", "六", "七", "八", "九"];

fn day_name(day: u32) -> String {
    match day {
        10 => "初十".to_string(),
        20 => "二十".to_string(),
        30 => "三十".to_string(),
        d if d < 10 => format!("初{}", DIGITS[d as usize]),
        d if d < 20 => format!("十{}", DIGITS[(d - 10) as usize]),
        d if d < 30 => format!("廿{}", DIGITS[(d - 20) as usize]),
        d => format!("三十{}", DIGITS[(d - 30) as usize]),
    }
}

/// Month and day in Chinese, e.g. "正月十五" or "闰二月初一".
pub fn chinese_month_day(lunar: &LunarDate) -> String {
    let month = MONTH_NAMES[(lunar.month as usize).saturating_sub(1) % 12];
    format!(
        "{}{}月{}",
        if lunar.leap { "闰" } else { "" },
        month,
        day_name(lunar.day)
    )
}

/// Placeholder shown when a date falls outside the supported table.
pub const LUNAR_PLACEHOLDER: &str = "农历日期";

/// Lunar label for display; never fails.
pub fn lunar_label(date: NaiveDate) -> String {
    to_lunar(date)
        .map(|l| chinese_month_day(&l))
        .unwrap_or_else(|_| LUNAR_PLACEHOLDER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn lunar(year: i32, month: u32, day: u32, leap: bool) -> LunarDate {
        LunarDate { year, month, day, leap }
    }

    #[test]
    fn spring_festival_dates() {
        for (solar, year) in [
            (d(1990, 1, 27), 1990),
            (d(2000, 2, 5), 2000),
            (d(2020, 1, 25), 2020),
            (d(2023, 1, 22), 2023),
            (d(2024, 2, 10), 2024),
            (d(2025, 1, 29), 2025),
            (d(2026, 2, 17), 2026),
        ] {
            assert_eq!(to_lunar(solar).unwrap(), lunar(year, 1, 1, false));
        }
        assert_eq!(to_lunar(d(2024, 2, 9)).unwrap(), lunar(2023, 12, 30, false));
    }

    #[test]
    fn leap_month_shares_the_month_number() {
        assert_eq!(to_lunar(d(2023, 3, 21)).unwrap(), lunar(2023, 2, 30, false));
        assert_eq!(to_lunar(d(2023, 3, 22)).unwrap(), lunar(2023, 2, 1, true));
        assert_eq!(to_lunar(d(2023, 4, 20)).unwrap(), lunar(2023, 3, 1, false));
    }

    #[test]
    fn from_lunar_inverts_to_lunar() {
        assert_eq!(from_lunar(2024, 1, 1).unwrap(), d(2024, 2, 10));
        assert_eq!(from_lunar(2023, 3, 1).unwrap(), d(2023, 4, 20));
        assert_eq!(from_lunar(2023, 2, 1).unwrap(), d(2023, 2, 20));

        let mut day = d(2019, 11, 1);
        while day < d(2021, 3, 1) {
            let l = to_lunar(day).unwrap();
            if !l.leap {
                assert_eq!(from_lunar(l.year, l.month, l.day).unwrap(), day);
            }
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn span_covers_leap_twin() {
        let (start, end) = lunar_month_span(2023, 2).unwrap();
        assert_eq!(start, d(2023, 2, 20));
        assert_eq!(end, d(2023, 4, 19));

        let (start, end) = lunar_month_span(2024, 1).unwrap();
        assert_eq!(start, d(2024, 2, 10));
        assert_eq!(end, d(2024, 3, 9));
    }

    #[test]
    fn out_of_range() {
        assert!(matches!(
            to_lunar(d(1900, 1, 30)),
            Err(AppError::CalendarOutOfRange(_))
        ));
        assert_eq!(last_supported_date(), d(2101, 1, 28));
        assert!(to_lunar(d(2101, 1, 28)).is_ok());
        assert!(to_lunar(d(2101, 1, 29)).is_err());
        assert_eq!(lunar_label(d(1850, 6, 1)), LUNAR_PLACEHOLDER);
    }

    #[test]
    fn chinese_labels() {
        assert_eq!(lunar_label(d(2024, 2, 24)), "正月十五");
        assert_eq!(lunar_label(d(2023, 3, 22)), "闰二月初一");
        assert_eq!(lunar_label(d(2024, 2, 9)), "腊月三十");
        assert_eq!(day_name(21), "廿一");
    }
}
