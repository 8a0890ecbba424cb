//! Projection output: monthly rows, yearly aggregation, run summary

use crate::error::Diagnostic;
use crate::timepoint::TimePoint;
use serde::{Deserialize, Serialize};

/// One month of the projected trajectory.
///
/// Historical months replay recorded values verbatim; projected months
/// carry the engine's computed flows. Amounts are currency units, rates
/// never appear here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionMonth {
    pub time: TimePoint,
    pub age: u8,

    /// Net worth at the end of the month
    pub balance: f64,

    /// Baseline balance from the plan settings alone, with overrides,
    /// scheduled items, and recorded history ignored
    pub planned_balance: f64,

    pub contribution: f64,
    pub withdrawal: f64,
    pub return_amount: f64,
    pub scheduled_cash_flow_impact: f64,

    pub is_historical: bool,
    pub is_retirement_month: bool,
}

impl ProjectionMonth {
    /// New row with all amounts zeroed
    pub fn new(time: TimePoint, age: u8) -> Self {
        Self {
            time,
            age,
            balance: 0.0,
            planned_balance: 0.0,
            contribution: 0.0,
            withdrawal: 0.0,
            return_amount: 0.0,
            scheduled_cash_flow_impact: 0.0,
            is_historical: false,
            is_retirement_month: false,
        }
    }
}

/// One calendar year of the trajectory. Years at the window edges, and
/// years with gaps in the recorded history, hold fewer than 12 months.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionYear {
    pub year: i32,
    pub months: Vec<ProjectionMonth>,
    pub has_historical_data: bool,
    pub is_retirement_transition_year: bool,
}

impl ProjectionYear {
    /// Balance at the end of the year's last emitted month
    pub fn end_balance(&self) -> f64 {
        self.months.last().map_or(0.0, |m| m.balance)
    }

    pub fn end_planned_balance(&self) -> f64 {
        self.months.last().map_or(0.0, |m| m.planned_balance)
    }

    pub fn total_contributions(&self) -> f64 {
        self.months.iter().map(|m| m.contribution).sum()
    }

    pub fn total_withdrawals(&self) -> f64 {
        self.months.iter().map(|m| m.withdrawal).sum()
    }
}

/// Complete result of projecting one plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub plan_id: u32,
    pub months: Vec<ProjectionMonth>,

    /// Non-fatal events resolved during the run
    pub diagnostics: Vec<Diagnostic>,

    /// Retirement month when it falls inside the projected window
    pub retirement_month: Option<TimePoint>,
}

impl ProjectionResult {
    pub fn new(plan_id: u32) -> Self {
        Self {
            plan_id,
            months: Vec::new(),
            diagnostics: Vec::new(),
            retirement_month: None,
        }
    }

    pub fn add_month(&mut self, month: ProjectionMonth) {
        self.months.push(month);
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Monthly rows bucketed by calendar year, in emission order
    pub fn by_year(&self) -> Vec<ProjectionYear> {
        let mut years: Vec<ProjectionYear> = Vec::new();
        for month in &self.months {
            match years.last_mut() {
                Some(year) if year.year == month.time.year => year.months.push(month.clone()),
                _ => years.push(ProjectionYear {
                    year: month.time.year,
                    months: vec![month.clone()],
                    has_historical_data: false,
                    is_retirement_transition_year: false,
                }),
            }
        }
        for year in &mut years {
            year.has_historical_data = year.months.iter().any(|m| m.is_historical);
            year.is_retirement_transition_year =
                self.retirement_month.map_or(false, |r| r.year == year.year);
        }
        years
    }

    /// Roll the monthly rows up into headline figures
    pub fn summary(&self) -> ProjectionSummary {
        let mut peak_balance = 0.0;
        let mut peak_month = None;
        for month in &self.months {
            if peak_month.is_none() || month.balance > peak_balance {
                peak_balance = month.balance;
                peak_month = Some(month.time);
            }
        }

        ProjectionSummary {
            plan_id: self.plan_id,
            months_projected: self.months.len(),
            final_balance: self.months.last().map_or(0.0, |m| m.balance),
            final_planned_balance: self.months.last().map_or(0.0, |m| m.planned_balance),
            peak_balance,
            peak_month,
            total_contributions: self.months.iter().map(|m| m.contribution).sum(),
            total_withdrawals: self.months.iter().map(|m| m.withdrawal).sum(),
            total_return: self.months.iter().map(|m| m.return_amount).sum(),
            total_scheduled_impact: self.months.iter().map(|m| m.scheduled_cash_flow_impact).sum(),
            depletion_month: self
                .months
                .iter()
                .find(|m| !m.is_historical && m.balance < 0.0)
                .map(|m| m.time),
        }
    }
}

/// Headline figures for one projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub plan_id: u32,
    pub months_projected: usize,
    pub final_balance: f64,
    pub final_planned_balance: f64,
    pub peak_balance: f64,
    pub peak_month: Option<TimePoint>,
    pub total_contributions: f64,
    pub total_withdrawals: f64,
    pub total_return: f64,
    pub total_scheduled_impact: f64,
    /// First projected month with a negative balance, if any
    pub depletion_month: Option<TimePoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(year: i32, month: u32, balance: f64) -> ProjectionMonth {
        let mut row = ProjectionMonth::new(TimePoint::new(year, month), 40);
        row.balance = balance;
        row.planned_balance = balance;
        row
    }

    fn sample_result() -> ProjectionResult {
        let mut result = ProjectionResult::new(3);
        let mut first = row(2025, 11, 10_000.0);
        first.is_historical = true;
        first.contribution = 1_000.0;
        result.add_month(first);

        let mut second = row(2025, 12, 11_200.0);
        second.contribution = 1_000.0;
        second.return_amount = 200.0;
        result.add_month(second);

        let mut third = row(2026, 1, 10_000.0);
        third.withdrawal = 1_400.0;
        third.return_amount = 200.0;
        third.is_retirement_month = true;
        result.add_month(third);

        result.retirement_month = Some(TimePoint::new(2026, 1));
        result
    }

    #[test]
    fn test_new_row_is_zeroed() {
        let row = ProjectionMonth::new(TimePoint::new(2030, 4), 44);
        assert_eq!(row.balance, 0.0);
        assert_eq!(row.contribution, 0.0);
        assert!(!row.is_historical);
        assert!(!row.is_retirement_month);
    }

    #[test]
    fn test_by_year_buckets_and_flags() {
        let years = sample_result().by_year();

        assert_eq!(years.len(), 2);
        assert_eq!(years[0].year, 2025);
        assert_eq!(years[0].months.len(), 2);
        assert!(years[0].has_historical_data);
        assert!(!years[0].is_retirement_transition_year);

        assert_eq!(years[1].year, 2026);
        assert_eq!(years[1].months.len(), 1);
        assert!(!years[1].has_historical_data);
        assert!(years[1].is_retirement_transition_year);

        assert_eq!(years[0].end_balance(), 11_200.0);
        assert_eq!(years[0].total_contributions(), 2_000.0);
        assert_eq!(years[1].total_withdrawals(), 1_400.0);
    }

    #[test]
    fn test_summary_totals() {
        let summary = sample_result().summary();

        assert_eq!(summary.months_projected, 3);
        assert_eq!(summary.final_balance, 10_000.0);
        assert_eq!(summary.peak_balance, 11_200.0);
        assert_eq!(summary.peak_month, Some(TimePoint::new(2025, 12)));
        assert_eq!(summary.total_contributions, 2_000.0);
        assert_eq!(summary.total_withdrawals, 1_400.0);
        assert_eq!(summary.total_return, 400.0);
        assert_eq!(summary.depletion_month, None);
    }

    #[test]
    fn test_summary_depletion_skips_historical_rows() {
        let mut result = ProjectionResult::new(1);
        let mut recorded = row(2025, 1, -500.0);
        recorded.is_historical = true;
        result.add_month(recorded);
        result.add_month(row(2025, 2, 300.0));
        result.add_month(row(2025, 3, -10.0));
        result.add_month(row(2025, 4, -250.0));

        // The recorded shortfall does not count; the first projected one does.
        assert_eq!(result.summary().depletion_month, Some(TimePoint::new(2025, 3)));
    }

    #[test]
    fn test_summary_of_empty_result() {
        let summary = ProjectionResult::new(9).summary();
        assert_eq!(summary.months_projected, 0);
        assert_eq!(summary.final_balance, 0.0);
        assert_eq!(summary.peak_month, None);
    }
}
