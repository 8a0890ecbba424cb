//! Typed historical indicator series with range queries
//!
//! A series stores month-keyed observations in one of two units: values
//! that are already monthly percentages (CDI, IPCA) or raw index levels
//! (PTAX, equity indices) that need a derived month-over-month variation.

use super::math;
use crate::timepoint::TimePoint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unit of the stored values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesUnit {
    /// Values are already monthly percentages.
    MonthlyPercent,
    /// Values are raw index levels; use the derived variation query.
    IndexLevel,
}

/// One observation of an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    pub time: TimePoint,
    pub value: f64,
}

/// A named indicator series, points kept sorted ascending by month.
#[derive(Debug, Clone)]
pub struct RateSeries {
    name: String,
    unit: SeriesUnit,
    points: Vec<RatePoint>,
}

impl RateSeries {
    /// Build a series from observations in any order.
    pub fn new(name: impl Into<String>, unit: SeriesUnit, mut points: Vec<RatePoint>) -> Self {
        points.sort_by_key(|p| p.time);
        Self {
            name: name.into(),
            unit,
            points,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> SeriesUnit {
        self.unit
    }

    pub fn points(&self) -> &[RatePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Observations in `[from, to]`, ascending. Empty when the window is
    /// inverted or holds no data.
    pub fn query(&self, from: TimePoint, to: TimePoint) -> Vec<RatePoint> {
        if from > to {
            return Vec::new();
        }
        let start = self.points.partition_point(|p| p.time < from);
        let end = self.points.partition_point(|p| p.time <= to);
        self.points[start..end].to_vec()
    }

    /// Month-over-month percent variation for raw index-level series.
    ///
    /// The window is extended one month before `from` so the first in-range
    /// month gets a delta. Pairs whose earlier value is <= 0 are skipped;
    /// fewer than 2 raw points in the extended window yields an empty list.
    pub fn query_with_derived_variation(&self, from: TimePoint, to: TimePoint) -> Vec<RatePoint> {
        let raw = self.query(from.add_months(-1), to);
        if raw.len() < 2 {
            return Vec::new();
        }

        let mut variations = Vec::with_capacity(raw.len() - 1);
        for pair in raw.windows(2) {
            let (prev, curr) = (pair[0], pair[1]);
            if curr.time < from {
                continue;
            }
            if let Some(variation) = math::variation_percent(prev.value, curr.value) {
                variations.push(RatePoint {
                    time: curr.time,
                    value: variation,
                });
            }
        }
        variations
    }

    /// Month-keyed lookup table for this series (see [`CompetenceTable`]).
    pub fn competence_table(&self) -> CompetenceTable {
        CompetenceTable::from_points(&self.points)
    }
}

/// Month-keyed lookup with backward fallback, used for exchange-rate-like
/// series where the most recent earlier observation stands in for a
/// missing month. The fallback is a business rule, not an error path.
#[derive(Debug, Clone, Default)]
pub struct CompetenceTable {
    by_month: BTreeMap<i32, f64>,
}

impl CompetenceTable {
    /// Index points by month; the latest value observed within a month
    /// wins.
    pub fn from_points(points: &[RatePoint]) -> Self {
        let mut by_month = BTreeMap::new();
        for point in points {
            by_month.insert(point.time.index(), point.value);
        }
        Self { by_month }
    }

    /// Value for `at`, or the nearest strictly-earlier month with data.
    /// `None` only when no earlier data exists at all.
    pub fn lookup(&self, at: TimePoint) -> Option<f64> {
        self.by_month
            .range(..=at.index())
            .next_back()
            .map(|(_, &value)| value)
    }

    pub fn is_empty(&self) -> bool {
        self.by_month.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_month.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(year: i32, month: u32, value: f64) -> RatePoint {
        RatePoint {
            time: TimePoint::new(year, month),
            value,
        }
    }

    fn sample_percent_series() -> RateSeries {
        RateSeries::new(
            "CDI",
            SeriesUnit::MonthlyPercent,
            vec![
                point(2024, 3, 0.83),
                point(2024, 1, 0.97),
                point(2024, 2, 0.80),
                point(2024, 5, 0.83),
            ],
        )
    }

    #[test]
    fn test_new_sorts_points() {
        let series = sample_percent_series();
        let months: Vec<u32> = series.points().iter().map(|p| p.time.month).collect();
        assert_eq!(months, vec![1, 2, 3, 5]);
    }

    #[test]
    fn test_query_inclusive_bounds() {
        let series = sample_percent_series();
        let result = series.query(TimePoint::new(2024, 2), TimePoint::new(2024, 5));

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].time, TimePoint::new(2024, 2));
        assert_eq!(result[2].time, TimePoint::new(2024, 5));
    }

    #[test]
    fn test_query_empty_cases() {
        let series = sample_percent_series();

        // Inverted window
        assert!(series
            .query(TimePoint::new(2024, 5), TimePoint::new(2024, 1))
            .is_empty());
        // No data in range
        assert!(series
            .query(TimePoint::new(2020, 1), TimePoint::new(2020, 12))
            .is_empty());
    }

    #[test]
    fn test_derived_variation_bootstraps_from_previous_month() {
        let series = RateSeries::new(
            "IBOV",
            SeriesUnit::IndexLevel,
            vec![
                point(2024, 1, 100.0),
                point(2024, 2, 110.0),
                point(2024, 3, 99.0),
                point(2024, 4, 108.9),
            ],
        );

        // Window starts at 02/2024 but the 01/2024 level seeds its delta.
        let result =
            series.query_with_derived_variation(TimePoint::new(2024, 2), TimePoint::new(2024, 4));

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].time, TimePoint::new(2024, 2));
        assert!((result[0].value - 10.0).abs() < 1e-10);
        assert!((result[1].value + 10.0).abs() < 1e-10);
        assert!((result[2].value - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_derived_variation_without_bootstrap_point() {
        let series = RateSeries::new(
            "IBOV",
            SeriesUnit::IndexLevel,
            vec![point(2024, 3, 100.0), point(2024, 4, 105.0)],
        );

        // No 02/2024 level, so 03/2024 itself gets no variation.
        let result =
            series.query_with_derived_variation(TimePoint::new(2024, 3), TimePoint::new(2024, 4));

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].time, TimePoint::new(2024, 4));
        assert!((result[0].value - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_derived_variation_skips_non_positive_prev() {
        let series = RateSeries::new(
            "X",
            SeriesUnit::IndexLevel,
            vec![
                point(2024, 1, 100.0),
                point(2024, 2, -5.0),
                point(2024, 3, 110.0),
            ],
        );

        let result =
            series.query_with_derived_variation(TimePoint::new(2024, 1), TimePoint::new(2024, 3));

        // (100 -> -5) is emitted, (-5 -> 110) is skipped.
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].time, TimePoint::new(2024, 2));
        assert!((result[0].value + 105.0).abs() < 1e-10);
    }

    #[test]
    fn test_derived_variation_needs_two_points() {
        let series = RateSeries::new(
            "X",
            SeriesUnit::IndexLevel,
            vec![point(2024, 1, 100.0)],
        );
        assert!(series
            .query_with_derived_variation(TimePoint::new(2024, 1), TimePoint::new(2024, 12))
            .is_empty());

        let empty = RateSeries::new("Y", SeriesUnit::IndexLevel, vec![]);
        assert!(empty
            .query_with_derived_variation(TimePoint::new(2024, 1), TimePoint::new(2024, 12))
            .is_empty());
    }

    #[test]
    fn test_competence_lookup_exact_and_fallback() {
        let table = CompetenceTable::from_points(&[
            point(2024, 1, 4.95),
            point(2024, 2, 4.97),
            point(2024, 5, 5.12),
        ]);

        assert_eq!(table.lookup(TimePoint::new(2024, 2)), Some(4.97));
        // 03/2024 and 04/2024 fall back to the 02/2024 observation.
        assert_eq!(table.lookup(TimePoint::new(2024, 3)), Some(4.97));
        assert_eq!(table.lookup(TimePoint::new(2024, 4)), Some(4.97));
        // Far future falls back to the latest observation.
        assert_eq!(table.lookup(TimePoint::new(2030, 1)), Some(5.12));
        // Before all data there is nothing to fall back to.
        assert_eq!(table.lookup(TimePoint::new(2023, 12)), None);
    }

    #[test]
    fn test_competence_latest_value_per_month_wins() {
        let table = CompetenceTable::from_points(&[
            point(2024, 1, 4.90),
            point(2024, 1, 4.99),
        ]);
        assert_eq!(table.lookup(TimePoint::new(2024, 1)), Some(4.99));
        assert_eq!(table.len(), 1);
    }
}
