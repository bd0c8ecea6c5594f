//! NYSE holiday table, computed per year rather than hardcoded as a fixed
//! list. Covers the fixed-date and floating holidays NYSE observes: New
//! Year's Day, MLK Day, Presidents Day, Good Friday, Memorial Day,
//! Juneteenth, Independence Day, Labor Day, Thanksgiving, Christmas.
//!
//! When a fixed-date holiday lands on a weekend, NYSE observes it on the
//! adjacent weekday (Saturday -> preceding Friday, Sunday -> following
//! Monday); that observed-date adjustment is applied here too.

use chrono::{Datelike, NaiveDate, Weekday};

/// Returns the `n`th occurrence of `weekday` in `year`-`month` (1-indexed:
/// `n = 1` is the first occurrence).
fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> NaiveDate {
    let first_of_month = NaiveDate::from_ymd_opt(year, month, 1).expect("valid y/m");
    let first_weekday = first_of_month.weekday();
    let offset = (7 + weekday.num_days_from_monday() as i64
        - first_weekday.num_days_from_monday() as i64)
        % 7;
    first_of_month + chrono::Duration::days(offset + 7 * (n as i64 - 1))
}

/// Returns the last occurrence of `weekday` in `year`-`month`.
fn last_weekday(year: i32, month: u32, weekday: Weekday) -> NaiveDate {
    let next_month_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("valid y/m");
    let mut day = next_month_first - chrono::Duration::days(1);
    while day.weekday() != weekday {
        day -= chrono::Duration::days(1);
    }
    day
}

/// Anonymous Gregorian algorithm for the date of Easter Sunday.
fn easter_sunday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32).expect("valid easter date")
}

/// Applies NYSE's weekend-observance rule to a fixed-date holiday.
fn observed(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date - chrono::Duration::days(1),
        Weekday::Sun => date + chrono::Duration::days(1),
        _ => date,
    }
}

/// All NYSE holidays observed in `year`.
pub fn nyse_holidays(year: i32) -> Vec<NaiveDate> {
    let mut days = vec![
        observed(NaiveDate::from_ymd_opt(year, 1, 1).unwrap()), // New Year's Day
        nth_weekday(year, 1, Weekday::Mon, 3),                  // MLK Day
        nth_weekday(year, 2, Weekday::Mon, 3),                  // Presidents Day
        easter_sunday(year) - chrono::Duration::days(2),        // Good Friday
        last_weekday(year, 5, Weekday::Mon),                    // Memorial Day
        observed(NaiveDate::from_ymd_opt(year, 6, 19).unwrap()), // Juneteenth
        observed(NaiveDate::from_ymd_opt(year, 7, 4).unwrap()), // Independence Day
        nth_weekday(year, 9, Weekday::Mon, 1),                  // Labor Day
        nth_weekday(year, 11, Weekday::Thu, 4),                 // Thanksgiving
        observed(NaiveDate::from_ymd_opt(year, 12, 25).unwrap()), // Christmas
    ];
    days.sort();
    days
}
