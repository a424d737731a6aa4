use chrono::{Datelike, NaiveDate};

// These are tedious arrays to aid the lookup of month lengths. Unfortunately the
// `chrono` library does not give us helpers for this.
const MONTH_LENGTHS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const MONTH_LENGTHS_LEAP: [u32; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Returns the number of days in a month, accounting for leap years.
/// `month0` is zero-based (January = 0, December = 11); any other value returns `None`.
pub fn days_in_month(year: i32, month0: u32) -> Option<u32> {
    let lengths = if is_leap_year(year) {
        &MONTH_LENGTHS_LEAP
    } else {
        &MONTH_LENGTHS
    };

    lengths.get(month0 as usize).copied()
}

/// Returns the first day of the month following `date`.
///
/// The date is stepped by value; the caller's date is never touched. Returns `None` only
/// when the next month lies beyond the range `chrono` can represent.
pub fn next_month_start(date: NaiveDate) -> Option<NaiveDate> {
    if date.month0() == 11 {
        NaiveDate::from_ymd_opt(date.year().checked_add(1)?, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
}
