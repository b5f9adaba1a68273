//! Calendar-month aggregation window

use crate::CoreError;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Half-open month interval `[first of month, first of next month)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthWindow {
    year: i32,
    month: u32,
}

impl MonthWindow {
    pub fn new(year: i32, month: u32) -> Result<Self, CoreError> {
        let window = Self { year, month };
        // Both bounds must be representable dates
        if !(1..=12).contains(&month) || window.bounds().is_none() {
            return Err(CoreError::InvalidWindow { year, month });
        }
        Ok(window)
    }

    /// Window containing the given date
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = NaiveDate::from_ymd_opt(self.year, self.month, 1)?;
        let end = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)?
        };
        Some((start, end))
    }

    /// First day of the month (inclusive bound)
    pub fn start(&self) -> NaiveDate {
        self.bounds().map(|(s, _)| s).unwrap_or(NaiveDate::MIN)
    }

    /// First day of the following month (exclusive bound)
    pub fn end(&self) -> NaiveDate {
        self.bounds().map(|(_, e)| e).unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start() && date < self.end()
    }

    /// Human label, e.g. "March 2025"
    pub fn label(&self) -> String {
        format!("{} {}", self.month_name(), self.year)
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[(self.month as usize).saturating_sub(1).min(11)]
    }

    /// The window immediately after this one
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_rejects_invalid_month() {
        assert!(MonthWindow::new(2025, 0).is_err());
        assert!(MonthWindow::new(2025, 13).is_err());
        assert!(MonthWindow::new(2025, 12).is_ok());
    }

    #[test]
    fn test_half_open_bounds() {
        let march = MonthWindow::new(2025, 3).unwrap();
        assert!(march.contains(d(2025, 3, 1)));
        assert!(march.contains(d(2025, 3, 31)));
        assert!(!march.contains(d(2025, 4, 1)));
        assert!(!march.contains(d(2025, 2, 28)));
    }

    #[test]
    fn test_december_rolls_over() {
        let december = MonthWindow::new(2024, 12).unwrap();
        assert_eq!(december.end(), d(2025, 1, 1));
        assert!(!december.contains(d(2025, 1, 1)));
        assert_eq!(december.next(), MonthWindow::new(2025, 1).unwrap());
    }

    #[test]
    fn test_label() {
        let window = MonthWindow::containing(d(2025, 3, 14));
        assert_eq!(window.label(), "March 2025");
    }
}
