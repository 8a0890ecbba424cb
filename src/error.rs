//! Error taxonomy: fatal configuration errors and non-fatal diagnostics
//!
//! Only configuration problems abort a projection. Everything with a
//! documented fallback (missing rate data, malformed scheduled items) is
//! resolved in place and surfaced on the result as a [`Diagnostic`].

use crate::timepoint::TimePoint;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Fatal input problems. The engine refuses to run rather than guess.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("birth date is required for projection")]
    MissingBirthDate,

    #[error("plan settings are required for projection")]
    MissingPlanSettings,

    #[error("invalid time point {year}/{month}: month must be 1-12")]
    InvalidMonth { year: i32, month: u32 },

    #[error("life expectancy must be positive")]
    InvalidLifeExpectancy,

    #[error("projection window is empty: start {start} is after end {end}")]
    EmptyWindow { start: TimePoint, end: TimePoint },

    #[error("indicator series '{0}' is not available as monthly rates")]
    UnknownSeries(String),
}

/// Non-fatal events resolved by a documented fallback and reported
/// alongside the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A rate lookup found no data; zero was substituted for that month.
    RateGap { series: String, at: TimePoint },

    /// A malformed scheduled item was treated as a no-op.
    ScheduleIgnored { item: String, reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::RateGap { series, at } => {
                write!(f, "series '{}' has no data at or before {}; substituted 0", series, at)
            }
            Diagnostic::ScheduleIgnored { item, reason } => {
                write!(f, "scheduled item '{}' ignored: {}", item, reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::EmptyWindow {
            start: TimePoint::new(2030, 5),
            end: TimePoint::new(2025, 1),
        };
        assert_eq!(
            err.to_string(),
            "projection window is empty: start 05/2030 is after end 01/2025"
        );

        let err = ConfigError::InvalidMonth { year: 2024, month: 13 };
        assert_eq!(err.to_string(), "invalid time point 2024/13: month must be 1-12");
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::RateGap {
            series: "IPCA".to_string(),
            at: TimePoint::new(2031, 3),
        };
        assert_eq!(
            diag.to_string(),
            "series 'IPCA' has no data at or before 03/2031; substituted 0"
        );
    }
}
