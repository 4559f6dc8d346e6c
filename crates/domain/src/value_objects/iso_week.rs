//! ISO-8601 calendar week, the key rotation unit

use std::fmt;

use chrono::{DateTime, Datelike, TimeZone};
use serde::{Deserialize, Serialize};

/// An ISO-8601 week-numbering (year, week) pair
///
/// The year is the ISO week-based year, which differs from the calendar
/// year for a few days around New Year (e.g. 2024-12-30 belongs to 2025-W1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IsoWeek {
    year: i32,
    week: u32,
}

impl IsoWeek {
    /// Compute the ISO week containing the given instant
    pub fn of<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        let iso = instant.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }

    /// ISO week-based year
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// ISO week number (1..=53)
    pub const fn week(&self) -> u32 {
        self.week
    }
}

/// Canonical form `"{year}-{week}"`, week not zero padded
impl fmt::Display for IsoWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.week)
    }
}
