//! Core projection engine
//!
//! One pass over the monthly window: recorded months replay verbatim,
//! projected months compound the running balance and apply stage flows,
//! the retirement switch, and scheduled cash flows. A parallel baseline
//! track runs the plan settings alone for comparison.

use super::output::{ProjectionMonth, ProjectionResult};
use super::state::{Phase, ProjectionState};
use crate::error::{ConfigError, Diagnostic};
use crate::plan::{ActualRecord, ClientPlan, PlanSettings};
use crate::rates::{math, CompetenceTable, Indicators, InflationOutlook};
use crate::schedule::{self, EffectiveStage};
use crate::timepoint::TimePoint;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};

/// Settings for a projection run, as opposed to the plan being run
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// Stop at this age instead of the profile's life expectancy
    pub limit_age: Option<u8>,

    /// Hard end month; wins over any age-derived horizon
    pub end_override: Option<TimePoint>,

    /// Indicator backing scheduled-item inflation. When the named series
    /// is not available the plan's own inflation assumption applies.
    pub inflation_series: Option<String>,

    /// Project returns from this indicator's monthly history instead of
    /// the plan's expected return. Months the series cannot answer run at
    /// zero and are reported on the result.
    pub return_series: Option<String>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            limit_age: None,
            end_override: None,
            inflation_series: Some("IPCA".to_string()),
            return_series: None,
        }
    }
}

/// Main projection engine. Holds the indicator set and run settings;
/// plans are passed per call, so one engine serves many plans.
pub struct ProjectionEngine {
    indicators: Indicators,
    config: ProjectionConfig,
}

impl ProjectionEngine {
    pub fn new(indicators: Indicators, config: ProjectionConfig) -> Self {
        Self { indicators, config }
    }

    /// Engine over the built-in benchmark history with default settings
    pub fn with_defaults() -> Self {
        Self::new(Indicators::default_benchmarks(), ProjectionConfig::default())
    }

    pub fn indicators(&self) -> &Indicators {
        &self.indicators
    }

    /// Project one plan across its full window.
    ///
    /// Months up to the latest recorded month replay the records; gaps in
    /// the recorded span are skipped, not interpolated. Everything after
    /// compounds forward from the last known balance.
    pub fn project(&self, plan: &ClientPlan) -> Result<ProjectionResult, ConfigError> {
        plan.validate()?;

        let start = plan.start;
        let end = self.end_month(plan)?;
        let retirement_month = plan.retirement_month();
        let handoff = plan.handoff();

        debug!(
            "plan {}: projecting {} to {}, retirement at {}",
            plan.plan_id, start, end, retirement_month
        );

        let mut result = ProjectionResult::new(plan.plan_id);
        if retirement_month >= start && retirement_month <= end {
            result.retirement_month = Some(retirement_month);
        }

        // Recorded months by index; a duplicated month keeps the later record.
        let actuals: HashMap<i32, &ActualRecord> =
            plan.actuals.iter().map(|a| (a.time.index(), a)).collect();

        let mut overrides = plan.stage_overrides.clone();
        schedule::sort_overrides(&mut overrides);

        // Malformed items become no-ops, reported once each.
        for item in &plan.scheduled_items {
            if let Some(reason) = schedule::schedule_issue(item) {
                warn!(
                    "plan {}: scheduled item '{}' ignored: {}",
                    plan.plan_id, item.name, reason
                );
                result.add_diagnostic(Diagnostic::ScheduleIgnored {
                    item: item.name.clone(),
                    reason: reason.to_string(),
                });
            }
        }

        let inflation = self.inflation_outlook(plan);
        self.report_inflation_gaps(plan, &inflation, start, end, &mut result);

        let mut impacts: HashMap<i32, f64> = HashMap::new();
        for occurrence in schedule::expand_within(&plan.scheduled_items, start, end, &inflation) {
            *impacts.entry(occurrence.time.index()).or_insert(0.0) += occurrence.amount;
        }

        let return_table = self.return_table()?;

        let settings = &plan.settings;
        let plan_monthly_return = settings.expected_monthly_return();
        let mut state = ProjectionState::from_plan(plan);

        for index in start.index()..=end.index() {
            let t = TimePoint::from_index(index);
            let age = plan.profile.age_at(t);
            let is_retirement = t >= retirement_month;
            let since_start = start.months_until(t);
            let since_retirement = retirement_month.months_until(t);

            // The baseline ignores records and interventions, so it advances
            // through every month of the window, skipped ones included.
            let (planned_contribution, planned_withdrawal) =
                planned_flows(settings, is_retirement, since_start, since_retirement);
            state.planned_balance = state.planned_balance
                + state.planned_balance * plan_monthly_return
                + planned_contribution
                - planned_withdrawal;

            let mut row = ProjectionMonth::new(t, age);
            row.planned_balance = state.planned_balance;
            row.is_retirement_month = is_retirement;

            if let Some(record) = actuals.get(&index) {
                row.balance = record.ending_balance;
                row.contribution = record.monthly_contribution;
                row.return_amount = record.monthly_return_amount;
                row.is_historical = true;
                state.balance = record.ending_balance;
                result.add_month(row);
                continue;
            }

            // A month inside the recorded span with no record is a gap.
            if handoff.map_or(false, |h| t <= h) {
                continue;
            }

            state.advance_to(if is_retirement {
                Phase::Decumulation
            } else {
                Phase::Accumulation
            });

            let (contribution, withdrawal) = if is_retirement {
                (0.0, retirement_withdrawal(settings, since_retirement))
            } else {
                let stage = schedule::resolve(t, settings, &overrides);
                (indexed_contribution(settings, &stage, since_start), 0.0)
            };

            let monthly_rate = match &return_table {
                Some((name, table)) => match table.lookup(t) {
                    Some(rate) => rate,
                    None => {
                        debug!("plan {}: no {} rate at or before {}", plan.plan_id, name, t);
                        result.add_diagnostic(Diagnostic::RateGap {
                            series: name.clone(),
                            at: t,
                        });
                        0.0
                    }
                },
                None => plan_monthly_return,
            };

            let return_amount = state.balance * monthly_rate;
            let impact = impacts.get(&index).copied().unwrap_or(0.0);
            let balance = state.balance + return_amount + contribution - withdrawal + impact;

            row.balance = balance;
            row.contribution = contribution;
            row.withdrawal = withdrawal;
            row.return_amount = return_amount;
            row.scheduled_cash_flow_impact = impact;
            state.balance = balance;
            result.add_month(row);
        }

        debug!(
            "plan {}: {} months emitted, finished in phase {:?}",
            plan.plan_id,
            result.months.len(),
            state.phase
        );
        Ok(result)
    }

    fn end_month(&self, plan: &ClientPlan) -> Result<TimePoint, ConfigError> {
        let end = if let Some(end) = self.config.end_override {
            if !end.is_valid() {
                return Err(ConfigError::InvalidMonth {
                    year: end.year,
                    month: end.month,
                });
            }
            end
        } else if let Some(age) = self.config.limit_age {
            plan.profile.month_of_age(age)
        } else {
            plan.life_expectancy_month()
        };

        if end < plan.start {
            return Err(ConfigError::EmptyWindow {
                start: plan.start,
                end,
            });
        }
        Ok(end)
    }

    fn inflation_outlook(&self, plan: &ClientPlan) -> InflationOutlook {
        let fallback = plan.settings.monthly_inflation();
        let table = match self.config.inflation_series.as_deref() {
            Some(name) => {
                let table = self.indicators.monthly_decimal_table(name);
                if table.is_none() {
                    warn!(
                        "inflation series '{}' not available; using the plan assumption",
                        name
                    );
                }
                table
            }
            None => None,
        };
        InflationOutlook::new(table, fallback)
    }

    fn return_table(&self) -> Result<Option<(String, CompetenceTable)>, ConfigError> {
        match self.config.return_series.as_deref() {
            Some(name) => {
                let table = self
                    .indicators
                    .monthly_decimal_table(name)
                    .ok_or_else(|| ConfigError::UnknownSeries(name.to_string()))?;
                Ok(Some((name.to_string(), table)))
            }
            None => Ok(None),
        }
    }

    /// Report each in-window occurrence month where an inflation-adjusted
    /// item hit a gap in the configured indicator, once per month.
    fn report_inflation_gaps(
        &self,
        plan: &ClientPlan,
        inflation: &InflationOutlook,
        start: TimePoint,
        end: TimePoint,
        result: &mut ProjectionResult,
    ) {
        let name = match self.config.inflation_series.as_deref() {
            Some(name) => name,
            None => return,
        };

        let mut seen = HashSet::new();
        for item in plan.scheduled_items.iter().filter(|i| i.adjust_for_inflation) {
            for occurrence in schedule::expand(item, inflation) {
                let t = occurrence.time;
                if t >= start && t <= end && inflation.gap_at(t) && seen.insert(t.index()) {
                    debug!("plan {}: no {} rate at or before {}", plan.plan_id, name, t);
                    result.add_diagnostic(Diagnostic::RateGap {
                        series: name.to_string(),
                        at: t,
                    });
                }
            }
        }
    }
}

/// Contribution for the month `since_start` months into the plan,
/// re-derived from indexed income and expenses when either flag is set.
fn indexed_contribution(settings: &PlanSettings, stage: &EffectiveStage, since_start: i32) -> f64 {
    if !settings.inflate_income && !settings.inflate_expenses {
        return stage.contribution;
    }
    let factor = math::compound_factor(settings.monthly_inflation(), since_start);
    let income = if settings.inflate_income {
        stage.income * factor
    } else {
        stage.income
    };
    let expenses = if settings.inflate_expenses {
        stage.expenses * factor
    } else {
        stage.expenses
    };
    (income - expenses).max(0.0)
}

/// Monthly retirement withdrawal, indexed from the retirement month when
/// the plan asks for it.
fn retirement_withdrawal(settings: &PlanSettings, since_retirement: i32) -> f64 {
    if settings.inflate_retirement_income {
        settings.retirement_monthly_income
            * math::compound_factor(settings.monthly_inflation(), since_retirement)
    } else {
        settings.retirement_monthly_income
    }
}

/// Flows for the baseline track: base settings only, no overrides.
fn planned_flows(
    settings: &PlanSettings,
    is_retirement: bool,
    since_start: i32,
    since_retirement: i32,
) -> (f64, f64) {
    if is_retirement {
        (0.0, retirement_withdrawal(settings, since_retirement))
    } else {
        let stage = EffectiveStage::from_base(settings);
        (indexed_contribution(settings, &stage, since_start), 0.0)
    }
}
