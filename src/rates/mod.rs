//! Market indicators: historical series storage, queries, and rate math

pub mod loader;
pub mod math;
mod series;

pub use loader::LoadedIndicators;
pub use series::{CompetenceTable, RatePoint, RateSeries, SeriesUnit};

use crate::timepoint::TimePoint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

// ============================================================================
// Built-in benchmark history
// ============================================================================
// Small recent windows so the engine runs with no external files. Values are
// monthly figures as published for 2023-2024.

/// Monthly CDI rate (%), B3 daily CDI compounded per calendar month.
const CDI_MONTHLY_PERCENT: [(i32, u32, f64); 24] = [
    (2023, 1, 1.12),
    (2023, 2, 0.92),
    (2023, 3, 1.17),
    (2023, 4, 0.92),
    (2023, 5, 1.12),
    (2023, 6, 1.07),
    (2023, 7, 1.07),
    (2023, 8, 1.14),
    (2023, 9, 0.97),
    (2023, 10, 1.00),
    (2023, 11, 0.92),
    (2023, 12, 0.89),
    (2024, 1, 0.97),
    (2024, 2, 0.80),
    (2024, 3, 0.83),
    (2024, 4, 0.89),
    (2024, 5, 0.83),
    (2024, 6, 0.79),
    (2024, 7, 0.91),
    (2024, 8, 0.87),
    (2024, 9, 0.84),
    (2024, 10, 0.93),
    (2024, 11, 0.79),
    (2024, 12, 0.93),
];

/// Monthly IPCA variation (%), IBGE.
const IPCA_MONTHLY_PERCENT: [(i32, u32, f64); 24] = [
    (2023, 1, 0.53),
    (2023, 2, 0.84),
    (2023, 3, 0.71),
    (2023, 4, 0.61),
    (2023, 5, 0.23),
    (2023, 6, -0.08),
    (2023, 7, 0.12),
    (2023, 8, 0.23),
    (2023, 9, 0.26),
    (2023, 10, 0.24),
    (2023, 11, 0.28),
    (2023, 12, 0.56),
    (2024, 1, 0.42),
    (2024, 2, 0.83),
    (2024, 3, 0.16),
    (2024, 4, 0.38),
    (2024, 5, 0.46),
    (2024, 6, 0.21),
    (2024, 7, 0.38),
    (2024, 8, -0.02),
    (2024, 9, 0.44),
    (2024, 10, 0.56),
    (2024, 11, 0.39),
    (2024, 12, 0.52),
];

/// Month-end PTAX selling rate, BRL per USD, Banco Central do Brasil.
const PTAX_MONTH_END: [(i32, u32, f64); 24] = [
    (2023, 1, 5.10),
    (2023, 2, 5.22),
    (2023, 3, 5.08),
    (2023, 4, 5.00),
    (2023, 5, 5.06),
    (2023, 6, 4.82),
    (2023, 7, 4.73),
    (2023, 8, 4.92),
    (2023, 9, 5.01),
    (2023, 10, 5.06),
    (2023, 11, 4.89),
    (2023, 12, 4.85),
    (2024, 1, 4.95),
    (2024, 2, 4.97),
    (2024, 3, 5.01),
    (2024, 4, 5.19),
    (2024, 5, 5.24),
    (2024, 6, 5.56),
    (2024, 7, 5.65),
    (2024, 8, 5.63),
    (2024, 9, 5.45),
    (2024, 10, 5.78),
    (2024, 11, 6.01),
    (2024, 12, 6.18),
];

fn series_from_table(name: &str, unit: SeriesUnit, table: &[(i32, u32, f64)]) -> RateSeries {
    let points = table
        .iter()
        .map(|&(year, month, value)| RatePoint {
            time: TimePoint::new(year, month),
            value,
        })
        .collect();
    RateSeries::new(name, unit, points)
}

/// Currency metadata for one indicator, consumed by callers that decide
/// whether a foreign-denominated return needs an FX adjustment. The engine
/// itself stays currency-agnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub value_currency: String,
    pub variation_currency: String,
    pub needs_fx_adjustment: bool,
}

impl IndicatorConfig {
    pub fn domestic(currency: &str) -> Self {
        Self {
            value_currency: currency.to_string(),
            variation_currency: currency.to_string(),
            needs_fx_adjustment: false,
        }
    }

    pub fn foreign(value_currency: &str, variation_currency: &str) -> Self {
        Self {
            value_currency: value_currency.to_string(),
            variation_currency: variation_currency.to_string(),
            needs_fx_adjustment: true,
        }
    }
}

/// Container for all indicator series available to a projection
#[derive(Debug, Clone, Default)]
pub struct Indicators {
    series: HashMap<String, RateSeries>,
    configs: HashMap<String, IndicatorConfig>,
}

impl Indicators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in CDI/IPCA/PTAX history (2023-2024 window).
    pub fn default_benchmarks() -> Self {
        let mut indicators = Self::new();
        indicators.insert_with_config(
            series_from_table("CDI", SeriesUnit::MonthlyPercent, &CDI_MONTHLY_PERCENT),
            IndicatorConfig::domestic("BRL"),
        );
        indicators.insert_with_config(
            series_from_table("IPCA", SeriesUnit::MonthlyPercent, &IPCA_MONTHLY_PERCENT),
            IndicatorConfig::domestic("BRL"),
        );
        indicators.insert_with_config(
            series_from_table("PTAX", SeriesUnit::IndexLevel, &PTAX_MONTH_END),
            IndicatorConfig::foreign("USD", "BRL"),
        );
        indicators
    }

    /// Load series from CSV files in the default location (data/indicators/)
    pub fn from_csv() -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_csv_path(Path::new(loader::DEFAULT_INDICATORS_PATH))
    }

    /// Load series from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let loaded = LoadedIndicators::load_from(path)?;

        let mut indicators = Self::new();
        indicators.insert_with_config(loaded.cdi, IndicatorConfig::domestic("BRL"));
        indicators.insert_with_config(loaded.ipca, IndicatorConfig::domestic("BRL"));
        indicators.insert_with_config(loaded.ptax, IndicatorConfig::foreign("USD", "BRL"));
        Ok(indicators)
    }

    pub fn insert(&mut self, series: RateSeries) {
        self.series.insert(series.name().to_string(), series);
    }

    pub fn insert_with_config(&mut self, series: RateSeries, config: IndicatorConfig) {
        self.configs.insert(series.name().to_string(), config);
        self.insert(series);
    }

    pub fn get(&self, name: &str) -> Option<&RateSeries> {
        self.series.get(name)
    }

    pub fn config(&self, name: &str) -> Option<&IndicatorConfig> {
        self.configs.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.series.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Competence table of monthly decimal rates for a MonthlyPercent
    /// series. Percent values are converted here, once, at ingestion.
    pub fn monthly_decimal_table(&self, name: &str) -> Option<CompetenceTable> {
        let series = self.get(name)?;
        if series.unit() != SeriesUnit::MonthlyPercent {
            return None;
        }
        let decimals: Vec<RatePoint> = series
            .points()
            .iter()
            .map(|p| RatePoint {
                time: p.time,
                value: math::percent_to_decimal(p.value),
            })
            .collect();
        Some(CompetenceTable::from_points(&decimals))
    }
}

/// Monthly inflation in effect at a given month.
///
/// Backed by an indicator competence table when one is configured; the
/// flat rate (usually the plan's own assumption) applies only when no
/// table backs the outlook. A configured table that has no data at or
/// before the requested month substitutes zero, and `gap_at` lets the
/// caller report that month.
#[derive(Debug, Clone, Default)]
pub struct InflationOutlook {
    table: Option<CompetenceTable>,
    flat_rate: f64,
}

impl InflationOutlook {
    pub fn new(table: Option<CompetenceTable>, flat_rate: f64) -> Self {
        Self { table, flat_rate }
    }

    /// Flat outlook with no indicator history.
    pub fn flat(rate: f64) -> Self {
        Self::new(None, rate)
    }

    /// Monthly inflation rate (decimal) in effect at `at`.
    pub fn monthly_rate_at(&self, at: TimePoint) -> f64 {
        match &self.table {
            Some(table) => table.lookup(at).unwrap_or(0.0),
            None => self.flat_rate,
        }
    }

    /// True when a configured table has no data at or before `at`.
    pub fn gap_at(&self, at: TimePoint) -> bool {
        matches!(&self.table, Some(table) if table.lookup(at).is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_benchmarks() {
        let indicators = Indicators::default_benchmarks();

        assert_eq!(indicators.names(), vec!["CDI", "IPCA", "PTAX"]);
        assert_eq!(indicators.get("CDI").unwrap().len(), 24);
        assert_eq!(indicators.get("PTAX").unwrap().unit(), SeriesUnit::IndexLevel);
        assert!(indicators.config("PTAX").unwrap().needs_fx_adjustment);
        assert!(!indicators.config("IPCA").unwrap().needs_fx_adjustment);
    }

    #[test]
    fn test_monthly_decimal_table_converts_once() {
        let indicators = Indicators::default_benchmarks();
        let table = indicators.monthly_decimal_table("IPCA").unwrap();

        // 0.53% in 01/2023 becomes 0.0053
        let value = table.lookup(TimePoint::new(2023, 1)).unwrap();
        assert!((value - 0.0053).abs() < 1e-12);

        // Index-level series have no monthly-percent reading
        assert!(indicators.monthly_decimal_table("PTAX").is_none());
        assert!(indicators.monthly_decimal_table("NOPE").is_none());
    }

    #[test]
    fn test_inflation_outlook_prefers_history() {
        let indicators = Indicators::default_benchmarks();
        let outlook = InflationOutlook::new(
            indicators.monthly_decimal_table("IPCA"),
            0.004,
        );

        // Inside the history window the indicator value wins.
        assert!((outlook.monthly_rate_at(TimePoint::new(2024, 2)) - 0.0083).abs() < 1e-12);
        // After the window the latest observation carries forward.
        assert!((outlook.monthly_rate_at(TimePoint::new(2031, 7)) - 0.0052).abs() < 1e-12);
        assert!(!outlook.gap_at(TimePoint::new(2031, 7)));
        // Before the window there is nothing to carry: zero, flagged as a gap.
        assert_eq!(outlook.monthly_rate_at(TimePoint::new(2019, 1)), 0.0);
        assert!(outlook.gap_at(TimePoint::new(2019, 1)));
    }

    #[test]
    fn test_flat_outlook() {
        let outlook = InflationOutlook::flat(0.003);
        assert_eq!(outlook.monthly_rate_at(TimePoint::new(2030, 6)), 0.003);
        // No table means no gaps to report.
        assert!(!outlook.gap_at(TimePoint::new(1990, 1)));
    }
}
