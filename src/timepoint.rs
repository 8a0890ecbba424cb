//! Calendar month arithmetic for projection timelines

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar month (competence) identifying one projection step.
///
/// Total order follows `year * 12 + month`, so derived lexicographic
/// ordering on `(year, month)` is equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimePoint {
    pub year: i32,
    /// Month number, 1-12
    pub month: u32,
}

impl TimePoint {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month), "month out of range: {}", month);
        Self { year, month }
    }

    /// Absolute month index (`year * 12 + month - 1`), the canonical
    /// iteration key for the projection loop.
    pub fn index(&self) -> i32 {
        self.year * 12 + self.month as i32 - 1
    }

    /// Inverse of [`index`](Self::index).
    pub fn from_index(index: i32) -> Self {
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// The month of a calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn add_months(self, months: i32) -> Self {
        Self::from_index(self.index() + months)
    }

    pub fn next(self) -> Self {
        self.add_months(1)
    }

    /// Signed number of months from `self` to `other` (positive when
    /// `other` is later).
    pub fn months_until(&self, other: TimePoint) -> i32 {
        other.index() - self.index()
    }

    /// Whole years elapsed since `earlier`. Used for attained age: the
    /// count increments exactly at the anniversary month.
    pub fn years_since(&self, earlier: TimePoint) -> i32 {
        (self.index() - earlier.index()).div_euclid(12)
    }

    pub fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month)
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}
