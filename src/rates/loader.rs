//! CSV-based indicator series loader
//!
//! Loads indicator history from `year,month,value` CSV files in
//! data/indicators/

use super::series::{RatePoint, RateSeries, SeriesUnit};
use crate::timepoint::TimePoint;
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Default path to the indicator data directory
pub const DEFAULT_INDICATORS_PATH: &str = "data/indicators";

/// Read `year,month,value` rows from any reader (file, string buffer,
/// network stream).
pub fn read_series_points<R: Read>(reader: R) -> Result<Vec<RatePoint>, Box<dyn Error>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut points = Vec::new();

    for result in csv_reader.records() {
        let record = result?;
        let year: i32 = record[0].parse()?;
        let month: u32 = record[1].parse()?;
        let value: f64 = record[2].parse()?;

        if !(1..=12).contains(&month) {
            return Err(format!("invalid month {} in indicator row", month).into());
        }

        points.push(RatePoint {
            time: TimePoint::new(year, month),
            value,
        });
    }

    Ok(points)
}

/// Load one series from `<dir>/<file>`.
pub fn load_series(
    dir: &Path,
    file: &str,
    name: &str,
    unit: SeriesUnit,
) -> Result<RateSeries, Box<dyn Error>> {
    let reader = File::open(dir.join(file))?;
    let points = read_series_points(reader)?;
    Ok(RateSeries::new(name, unit, points))
}

/// All indicator series loaded from a directory
pub struct LoadedIndicators {
    pub cdi: RateSeries,
    pub ipca: RateSeries,
    pub ptax: RateSeries,
}

impl LoadedIndicators {
    /// Load all series from the default path
    pub fn load_default() -> Result<Self, Box<dyn Error>> {
        Self::load_from(Path::new(DEFAULT_INDICATORS_PATH))
    }

    /// Load all series from a specific directory
    pub fn load_from(dir: &Path) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            cdi: load_series(dir, "cdi.csv", "CDI", SeriesUnit::MonthlyPercent)?,
            ipca: load_series(dir, "ipca.csv", "IPCA", SeriesUnit::MonthlyPercent)?,
            ptax: load_series(dir, "ptax.csv", "PTAX", SeriesUnit::IndexLevel)?,
        })
    }
}
