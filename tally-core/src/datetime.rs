//! Calendar dates for the date calculator
//!
//! Whole-day dates on the proleptic Gregorian calendar, stored as days
//! since the Unix epoch so differences and offsets are plain integer math.
//!
//! Design principles:
//! - No external datetime crates
//! - No time of day, no timezone: a date is a calendar day
//! - Never panics - construction validates, arithmetic is checked

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Days in each month (non-leap year)
const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Days from 0000-03-01 to 1970-01-01
const UNIX_EPOCH_DAYS: i64 = 719_468;

/// Supported range, inclusive (years 1..=9999 keeps ISO rendering at 4 digits)
const MIN_DAYS: i64 = -719_162; // 0001-01-01
const MAX_DAYS: i64 = 2_932_896; // 9999-12-31

/// Errors from date construction, parsing and arithmetic
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("Invalid month: {0} (must be 1-12)")]
    InvalidMonth(u32),

    #[error("Invalid day: {0} for {1}/{2}")]
    InvalidDay(u32, u32, i32),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Date out of supported range")]
    Overflow,
}

/// A calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CalendarDate {
    /// Days since 1970-01-01 (negative before)
    days: i64,
}

impl CalendarDate {
    /// Create a date from year, month (1-12) and day (1-31)
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        if !(1..=12).contains(&month) {
            return Err(DateError::InvalidMonth(month));
        }
        let max_day = days_in_month(year, month);
        if day < 1 || day > max_day {
            return Err(DateError::InvalidDay(day, month, year));
        }
        Self::from_epoch_days(days_from_civil(year, month, day))
    }

    /// Create a date from days since the Unix epoch
    pub fn from_epoch_days(days: i64) -> Result<Self, DateError> {
        if !(MIN_DAYS..=MAX_DAYS).contains(&days) {
            return Err(DateError::Overflow);
        }
        Ok(Self { days })
    }

    /// Parse an ISO 8601 calendar date: `YYYY-MM-DD`
    pub fn parse(s: &str) -> Result<Self, DateError> {
        let s = s.trim();
        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() != 3 || parts[0].len() != 4 {
            return Err(DateError::ParseError(format!("Expected YYYY-MM-DD, got '{}'", s)));
        }

        let year: i32 = parts[0].parse()
            .map_err(|_| DateError::ParseError("Invalid year".to_string()))?;
        let month: u32 = parts[1].parse()
            .map_err(|_| DateError::ParseError("Invalid month".to_string()))?;
        let day: u32 = parts[2].parse()
            .map_err(|_| DateError::ParseError("Invalid day".to_string()))?;

        Self::from_ymd(year, month, day)
    }

    pub fn epoch_days(&self) -> i64 {
        self.days
    }

    pub fn to_ymd(&self) -> (i32, u32, u32) {
        civil_from_days(self.days)
    }

    /// Add (or with a negative count, subtract) whole days
    pub fn add_days(&self, days: i64) -> Result<Self, DateError> {
        let target = self.days.checked_add(days).ok_or(DateError::Overflow)?;
        Self::from_epoch_days(target)
    }

    /// Absolute number of days between two dates
    pub fn days_between(&self, other: &CalendarDate) -> i64 {
        (other.days - self.days).abs()
    }

    pub fn to_iso_string(&self) -> String {
        let (y, m, d) = self.to_ymd();
        format!("{:04}-{:02}-{:02}", y, m, d)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_iso_string())
    }
}

// ============================================================================
// Calendar Utilities (Gregorian proleptic)
// ============================================================================

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        m if (1..=12).contains(&m) => DAYS_IN_MONTH[(m - 1) as usize],
        _ => 0,
    }
}

/// Convert civil date to days since Unix epoch
/// Algorithm from Howard Hinnant: http://howardhinnant.github.io/date_algorithms.html
fn days_from_civil(year: i32, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year } as i64;
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400; // [0, 399]
    let m = month as i64;
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + day as i64 - 1; // [0, 365]
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy; // [0, 146096]
    era * 146097 + doe - UNIX_EPOCH_DAYS
}

/// Convert days since Unix epoch to civil date
fn civil_from_days(days: i64) -> (i32, u32, u32) {
    let z = days + UNIX_EPOCH_DAYS;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = z - era * 146097; // [0, 146096]
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365; // [0, 399]
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // [0, 11]
    let d = doy - (153 * mp + 2) / 5 + 1; // [1, 31]
    let m = if mp < 10 { mp + 3 } else { mp - 9 }; // [1, 12]
    let year = if m <= 2 { y + 1 } else { y };
    (year as i32, m as u32, d as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_roundtrip() {
        let epoch = CalendarDate::from_ymd(1970, 1, 1).unwrap();
        assert_eq!(epoch.epoch_days(), 0);
        assert_eq!(epoch.to_ymd(), (1970, 1, 1));
    }

    #[test]
    fn test_parse_and_render() {
        let d = CalendarDate::parse("2024-02-29").unwrap();
        assert_eq!(d.to_iso_string(), "2024-02-29");
        assert_eq!(d.to_string(), "2024-02-29");
    }

    #[test]
    fn test_parse_rejects_invalid_components() {
        assert_eq!(CalendarDate::parse("2023-02-29"), Err(DateError::InvalidDay(29, 2, 2023)));
        assert_eq!(CalendarDate::parse("2023-13-01"), Err(DateError::InvalidMonth(13)));
        assert!(matches!(CalendarDate::parse("yesterday"), Err(DateError::ParseError(_))));
        assert!(matches!(CalendarDate::parse("24-01-01"), Err(DateError::ParseError(_))));
    }

    #[test]
    fn test_days_between_is_symmetric() {
        let a = CalendarDate::parse("2024-01-01").unwrap();
        let b = CalendarDate::parse("2024-03-01").unwrap();
        assert_eq!(a.days_between(&b), 60);
        assert_eq!(b.days_between(&a), 60);
    }

    #[test]
    fn test_add_days_crosses_year() {
        let d = CalendarDate::parse("2023-12-25").unwrap();
        assert_eq!(d.add_days(10).unwrap().to_iso_string(), "2024-01-04");
        assert_eq!(d.add_days(-358).unwrap().to_iso_string(), "2023-01-01");
    }

    #[test]
    fn test_add_days_out_of_range() {
        let d = CalendarDate::parse("9999-12-31").unwrap();
        assert_eq!(d.add_days(1), Err(DateError::Overflow));
        assert_eq!(d.add_days(i64::MAX), Err(DateError::Overflow));
    }

    #[test]
    fn test_leap_years() {
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2023, 0), 0);
    }
}
