//! Rate conversion and compounding primitives
//!
//! All functions take and return decimal rates (0.015 = 1.5%) unless the
//! name says percent. Conversion between the percent-scaled boundary
//! representation and internal decimals happens once, at ingestion.

/// Monthly rate that compounds to the given annual rate:
/// `(1 + annual)^(1/12) - 1`.
///
/// Never `annual / 12`; simple division overstates the compounded result.
pub fn monthly_equivalent(annual: f64) -> f64 {
    (1.0 + annual).powf(1.0 / 12.0) - 1.0
}

/// Annual rate produced by compounding a monthly rate twelve times.
pub fn annual_equivalent(monthly: f64) -> f64 {
    (1.0 + monthly).powi(12) - 1.0
}

/// Growth factor after `periods` applications of `rate`: `(1 + rate)^periods`.
pub fn compound_factor(rate: f64, periods: i32) -> f64 {
    (1.0 + rate).powi(periods)
}

/// Chained compounding of a sequence of period rates:
/// `(1+r1)(1+r2)...(1+rn) - 1`.
pub fn chain(rates: &[f64]) -> f64 {
    rates.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0
}

/// Percent variation between two raw values: `(curr - prev) / prev * 100`.
///
/// Returns `None` when `prev <= 0`, where the ratio is meaningless for
/// index levels.
pub fn variation_percent(prev: f64, curr: f64) -> Option<f64> {
    if prev <= 0.0 {
        return None;
    }
    Some((curr - prev) / prev * 100.0)
}

pub fn percent_to_decimal(percent: f64) -> f64 {
    percent / 100.0
}

pub fn decimal_to_percent(decimal: f64) -> f64 {
    decimal * 100.0
}
