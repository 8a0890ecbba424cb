//! Scenario runner for efficient batch projections
//!
//! Pre-loads indicator history once, then runs many projections with
//! different configurations without re-reading CSV files.

use crate::error::ConfigError;
use crate::plan::ClientPlan;
use crate::rates::Indicators;
use crate::projection::{ProjectionConfig, ProjectionEngine, ProjectionResult};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Pre-loaded scenario runner
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
///
/// for age in [60, 65, 70] {
///     let config = ProjectionConfig { limit_age: Some(age), ..Default::default() };
///     let result = runner.run(&plan, config)?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    indicators: Indicators,
}

impl ScenarioRunner {
    /// Runner over the built-in benchmark history
    pub fn new() -> Self {
        Self {
            indicators: Indicators::default_benchmarks(),
        }
    }

    /// Runner with indicators loaded from the default CSV location
    pub fn from_csv() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            indicators: Indicators::from_csv()?,
        })
    }

    /// Runner with indicators loaded from a specific directory
    pub fn from_csv_path(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            indicators: Indicators::from_csv_path(path)?,
        })
    }

    /// Runner over pre-built indicators
    pub fn with_indicators(indicators: Indicators) -> Self {
        Self { indicators }
    }

    /// Run a single projection with the given config
    pub fn run(&self, plan: &ClientPlan, config: ProjectionConfig) -> Result<ProjectionResult, ConfigError> {
        let engine = ProjectionEngine::new(self.indicators.clone(), config);
        engine.project(plan)
    }

    /// Project many plans with the same config, in parallel. Each plan
    /// fails or succeeds on its own; order follows the input.
    pub fn run_batch(
        &self,
        plans: &[ClientPlan],
        config: ProjectionConfig,
    ) -> Vec<Result<ProjectionResult, ConfigError>> {
        let engine = ProjectionEngine::new(self.indicators.clone(), config);
        plans.par_iter().map(|plan| engine.project(plan)).collect()
    }

    /// Run one plan under several configs
    pub fn run_scenarios(
        &self,
        plan: &ClientPlan,
        configs: &[ProjectionConfig],
    ) -> Vec<Result<ProjectionResult, ConfigError>> {
        configs
            .iter()
            .map(|config| {
                let engine = ProjectionEngine::new(self.indicators.clone(), config.clone());
                engine.project(plan)
            })
            .collect()
    }

    /// Project a base plan and a revised plan under the same config and
    /// pair their trajectories for comparison.
    pub fn compare(
        &self,
        base: &ClientPlan,
        revised: &ClientPlan,
        config: ProjectionConfig,
    ) -> Result<PlanComparison, ConfigError> {
        let engine = ProjectionEngine::new(self.indicators.clone(), config);
        Ok(PlanComparison {
            base: engine.project(base)?,
            revised: engine.project(revised)?,
        })
    }

    pub fn indicators(&self) -> &Indicators {
        &self.indicators
    }

    pub fn indicators_mut(&mut self) -> &mut Indicators {
        &mut self.indicators
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Two projections of the same horizon, side by side
#[derive(Debug, Clone)]
pub struct PlanComparison {
    pub base: ProjectionResult,
    pub revised: ProjectionResult,
}

/// Year-end balances of both tracks and their difference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearlyDelta {
    pub year: i32,
    pub base_end_balance: f64,
    pub revised_end_balance: f64,
    pub delta: f64,
}

impl PlanComparison {
    pub fn final_balance_delta(&self) -> f64 {
        let last = |result: &ProjectionResult| result.months.last().map_or(0.0, |m| m.balance);
        last(&self.revised) - last(&self.base)
    }

    /// Year-end deltas over the union of both windows. A year absent from
    /// one side reads as zero there.
    pub fn yearly_deltas(&self) -> Vec<YearlyDelta> {
        let mut years: BTreeMap<i32, (f64, f64)> = BTreeMap::new();
        for year in self.base.by_year() {
            years.entry(year.year).or_insert((0.0, 0.0)).0 = year.end_balance();
        }
        for year in self.revised.by_year() {
            years.entry(year.year).or_insert((0.0, 0.0)).1 = year.end_balance();
        }
        years
            .into_iter()
            .map(|(year, (base, revised))| YearlyDelta {
                year,
                base_end_balance: base,
                revised_end_balance: revised,
                delta: revised - base,
            })
            .collect()
    }
}
