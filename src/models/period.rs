//! Reporting periods
//!
//! A [`PeriodWindow`] is an inclusive date range. Windows are derived from a
//! [`PeriodSelector`] and a reference date that the caller passes in; nothing
//! here reads the system clock.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive date range used to filter transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodWindow {
    /// Create a window; `start` must not be after `end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PeriodParseError> {
        if start > end {
            return Err(PeriodParseError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// A calendar month
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Self {
            start,
            end: next - Duration::days(1),
        })
    }

    /// The calendar month containing `date`
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        // No month is longer than 31 days, so the 1st plus 31 days is in the next month
        let next = (start + Duration::days(31)).with_day(1).unwrap_or(start);
        Self {
            start,
            end: next - Duration::days(1),
        }
    }

    /// A calendar year
    pub fn year(year: i32) -> Option<Self> {
        Some(Self {
            start: NaiveDate::from_ymd_opt(year, 1, 1)?,
            end: NaiveDate::from_ymd_opt(year, 12, 31)?,
        })
    }

    /// Every representable date
    pub fn all_time() -> Self {
        Self {
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
        }
    }

    pub fn is_all_time(&self) -> bool {
        self.start == NaiveDate::MIN && self.end == NaiveDate::MAX
    }

    /// Check if a date falls within this window (both ends inclusive)
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of calendar months the window touches
    pub fn months_spanned(&self) -> u32 {
        months_between(self.start, self.end)
    }

    /// The window of the same kind immediately before this one, for month windows
    pub fn previous_month(&self) -> Self {
        Self::month_of(self.start - Duration::days(1))
    }
}

impl fmt::Display for PeriodWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all_time() {
            write!(f, "all time")
        } else {
            write!(f, "{} to {}", self.start, self.end)
        }
    }
}

/// Calendar months touched by the range `start..=end` (at least 1)
pub fn months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    let diff = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    (diff + 1).max(1) as u32
}

/// Named period choices, resolved against a reference date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PeriodSelector {
    CurrentMonth,
    PreviousMonth,
    CurrentYear,
    AllTime,
    Month { year: i32, month: u32 },
    Custom { start: NaiveDate, end: NaiveDate },
}

impl PeriodSelector {
    /// Resolve the selector to a concrete window relative to `today`
    pub fn window(&self, today: NaiveDate) -> Result<PeriodWindow, PeriodParseError> {
        match *self {
            Self::CurrentMonth => Ok(PeriodWindow::month_of(today)),
            Self::PreviousMonth => Ok(PeriodWindow::month_of(today).previous_month()),
            Self::CurrentYear => {
                PeriodWindow::year(today.year()).ok_or(PeriodParseError::OutOfRange)
            }
            Self::AllTime => Ok(PeriodWindow::all_time()),
            Self::Month { year, month } => {
                PeriodWindow::month(year, month).ok_or(PeriodParseError::OutOfRange)
            }
            Self::Custom { start, end } => PeriodWindow::new(start, end),
        }
    }

    /// Parse a period string
    ///
    /// Formats:
    /// - `month`, `prev-month`, `year`, `all`
    /// - `2025-01` for a specific month
    /// - `2025-01-01..2025-01-15` for a custom range
    pub fn parse(s: &str) -> Result<Self, PeriodParseError> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "month" | "current-month" => return Ok(Self::CurrentMonth),
            "prev-month" | "previous-month" | "last-month" => return Ok(Self::PreviousMonth),
            "year" | "current-year" => return Ok(Self::CurrentYear),
            "all" | "all-time" => return Ok(Self::AllTime),
            _ => {}
        }

        if let Some((start, end)) = s.split_once("..") {
            let start = parse_iso(start)?;
            let end = parse_iso(end)?;
            PeriodWindow::new(start, end)?;
            return Ok(Self::Custom { start, end });
        }

        if let Some((year, month)) = s.split_once('-') {
            let year: i32 = year
                .parse()
                .map_err(|_| PeriodParseError::InvalidFormat(s.to_string()))?;
            let month: u32 = month
                .parse()
                .map_err(|_| PeriodParseError::InvalidFormat(s.to_string()))?;
            if PeriodWindow::month(year, month).is_none() {
                return Err(PeriodParseError::OutOfRange);
            }
            return Ok(Self::Month { year, month });
        }

        Err(PeriodParseError::InvalidFormat(s.to_string()))
    }
}

fn parse_iso(s: &str) -> Result<NaiveDate, PeriodParseError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| PeriodParseError::InvalidFormat(s.to_string()))
}

/// Error type for period parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PeriodParseError {
    #[error("Invalid period format: {0}")]
    InvalidFormat(String),
    #[error("Period start {start} is after end {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
    #[error("Period is outside the supported date range")]
    OutOfRange,
}
