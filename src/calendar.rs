// src/calendar.rs
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};

// --- Reporting Window ---

/// The window a report covers: an explicit inclusive range, or a whole month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportingWindow {
    Range { start: NaiveDate, end: NaiveDate },
    Month { year: i32, month: u32 },
}

impl ReportingWindow {
    /// The filter layer hands over an optional start/end pair and always a
    /// month. The range wins only when both ends are present.
    pub fn from_filter(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        year: i32,
        month: u32,
    ) -> Self {
        match (start, end) {
            (Some(start), Some(end)) => ReportingWindow::Range { start, end },
            _ => ReportingWindow::Month { year, month },
        }
    }

    /// Parses `YYYY-MM`.
    pub fn parse_month(value: &str) -> EngineResult<Self> {
        let (year, month) = value
            .trim()
            .split_once('-')
            .ok_or_else(|| EngineError::InvalidWindow(format!("expected YYYY-MM, got '{}'", value)))?;
        let year = year
            .parse::<i32>()
            .map_err(|_| EngineError::InvalidWindow(format!("invalid year in '{}'", value)))?;
        let month = month
            .parse::<u32>()
            .map_err(|_| EngineError::InvalidWindow(format!("invalid month in '{}'", value)))?;
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(EngineError::InvalidWindow(format!(
                "month out of range in '{}'",
                value
            )));
        }
        Ok(ReportingWindow::Month { year, month })
    }
}

// --- Range Building ---

pub fn is_rest_day(date: NaiveDate, rest_day: Weekday) -> bool {
    date.weekday() == rest_day
}

/// Every date of the window in ascending order, rest days omitted. Dates are
/// built from their (year, month, day) components, never from text.
pub fn build_calendar_range(window: &ReportingWindow, rest_day: Weekday) -> Vec<NaiveDate> {
    let (start, end) = match *window {
        ReportingWindow::Range { start, end } => (start, end),
        ReportingWindow::Month { year, month } => match month_bounds(year, month) {
            Some(bounds) => bounds,
            None => {
                warn!("Ignoring invalid month {}-{:02} in reporting window", year, month);
                return Vec::new();
            }
        },
    };

    let dates = working_days_between(start, end, rest_day);
    debug!(
        "Built calendar range {} to {}: {} working days",
        start,
        end,
        dates.len()
    );
    dates
}

/// First and last day of a month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_first.pred_opt()?))
}

/// Non-rest days in `[start, end]`, inclusive. Empty when `start > end`.
pub fn working_days_between(start: NaiveDate, end: NaiveDate, rest_day: Weekday) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    start
        .iter_days()
        .take_while(|date| *date <= end)
        .filter(|date| !is_rest_day(*date, rest_day))
        .collect()
}

pub fn count_working_days(start: NaiveDate, end: NaiveDate, rest_day: Weekday) -> u32 {
    if start > end {
        return 0;
    }
    start
        .iter_days()
        .take_while(|date| *date <= end)
        .filter(|date| !is_rest_day(*date, rest_day))
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .unwrap_or_else(|_| panic!("Invalid date string format: {}", date_str))
    }

    #[test]
    fn test_month_range_skips_sundays() {
        // August 2025 has 31 days and five Sundays (3, 10, 17, 24, 31)
        let dates = build_calendar_range(
            &ReportingWindow::Month { year: 2025, month: 8 },
            Weekday::Sun,
        );
        assert_eq!(dates.len(), 26);
        assert_eq!(dates.first(), Some(&d("2025-08-01")));
        assert_eq!(dates.last(), Some(&d("2025-08-30")));
        assert!(dates.iter().all(|date| date.weekday() != Weekday::Sun));
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_explicit_range_is_inclusive() {
        let dates = build_calendar_range(
            &ReportingWindow::Range {
                start: d("2025-08-01"),
                end: d("2025-08-05"),
            },
            Weekday::Sun,
        );
        assert_eq!(
            dates,
            vec![d("2025-08-01"), d("2025-08-02"), d("2025-08-04"), d("2025-08-05")]
        );
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let dates = build_calendar_range(
            &ReportingWindow::Range {
                start: d("2025-08-05"),
                end: d("2025-08-01"),
            },
            Weekday::Sun,
        );
        assert!(dates.is_empty());
    }

    #[test]
    fn test_december_and_leap_february() {
        let (first, last) = month_bounds(2025, 12).unwrap();
        assert_eq!((first, last), (d("2025-12-01"), d("2025-12-31")));
        let (_, last) = month_bounds(2024, 2).unwrap();
        assert_eq!(last, d("2024-02-29"));
        assert!(month_bounds(2025, 13).is_none());
    }

    #[test]
    fn test_invalid_month_window_is_empty() {
        let dates = build_calendar_range(
            &ReportingWindow::Month { year: 2025, month: 0 },
            Weekday::Sun,
        );
        assert!(dates.is_empty());
    }

    #[test]
    fn test_from_filter_prefers_complete_range() {
        let start = d("2025-08-01");
        let end = d("2025-08-03");
        assert_eq!(
            ReportingWindow::from_filter(Some(start), Some(end), 2025, 9),
            ReportingWindow::Range { start, end }
        );
        assert_eq!(
            ReportingWindow::from_filter(Some(start), None, 2025, 9),
            ReportingWindow::Month { year: 2025, month: 9 }
        );
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(
            ReportingWindow::parse_month("2025-08").unwrap(),
            ReportingWindow::Month { year: 2025, month: 8 }
        );
        assert!(ReportingWindow::parse_month("2025/08").is_err());
        assert!(ReportingWindow::parse_month("2025-13").is_err());
    }

    #[test]
    fn test_count_working_days_respects_rest_day() {
        // Mon 2025-08-04 .. Sun 2025-08-10
        assert_eq!(count_working_days(d("2025-08-04"), d("2025-08-10"), Weekday::Sun), 6);
        assert_eq!(count_working_days(d("2025-08-04"), d("2025-08-10"), Weekday::Wed), 6);
        assert_eq!(count_working_days(d("2025-08-10"), d("2025-08-10"), Weekday::Sun), 0);
        assert_eq!(count_working_days(d("2025-08-10"), d("2025-08-04"), Weekday::Sun), 0);
    }
}
