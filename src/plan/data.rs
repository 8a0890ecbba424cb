//! Client plan data structures passed in whole on every projection request

use crate::error::ConfigError;
use crate::rates::math;
use crate::timepoint::TimePoint;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Default life expectancy when the profile does not say
fn default_life_expectancy() -> u8 {
    90
}

/// Default retirement age
fn default_retirement_age() -> u8 {
    65
}

fn default_installment_count() -> u32 {
    1
}

fn default_installment_interval() -> u32 {
    1
}

/// Whether a scheduled item is a savings goal or a life event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Goal,
    Event,
}

impl ItemKind {
    pub fn is_goal(&self) -> bool {
        matches!(self, ItemKind::Goal)
    }
}

/// How a scheduled item's amount lands on the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    /// Single occurrence of the full amount at the anchor month
    None,
    /// Total amount split evenly across the occurrences
    Installment,
    /// Full amount recurring at each occurrence
    Repeat,
}

impl Default for PaymentMode {
    fn default() -> Self {
        PaymentMode::None
    }
}

/// Who the plan is for: the dates that anchor age arithmetic
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClientProfile {
    /// Birth date; month granularity drives retirement and age math
    pub birth_date: NaiveDate,

    /// Age the projection runs to when no explicit limit is configured
    #[serde(default = "default_life_expectancy")]
    pub life_expectancy_years: u8,
}

impl ClientProfile {
    pub fn new(birth_date: NaiveDate, life_expectancy_years: u8) -> Self {
        Self {
            birth_date,
            life_expectancy_years,
        }
    }

    /// Birth month as a TimePoint.
    pub fn birth_month(&self) -> TimePoint {
        TimePoint::from_date(self.birth_date)
    }

    /// The month this client turns `age` (the birthday month).
    pub fn month_of_age(&self, age: u8) -> TimePoint {
        TimePoint::new(self.birth_date.year() + age as i32, self.birth_date.month())
    }

    /// Attained age in whole years at `at`, incrementing at the birthday
    /// month.
    pub fn age_at(&self, at: TimePoint) -> u8 {
        at.years_since(self.birth_month()).max(0) as u8
    }
}

/// Base plan parameters, one set per plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSettings {
    /// Net worth at plan start
    pub starting_balance: f64,

    /// Gross monthly income before any stage override
    pub base_monthly_income: f64,

    /// Monthly living expenses before any stage override
    pub base_monthly_expenses: f64,

    /// Expected portfolio return, annual, percent-scaled (6.5 = 6.5% p.a.)
    pub expected_annual_return_percent: f64,

    /// Assumed inflation, annual, percent-scaled
    #[serde(default)]
    pub annual_inflation_percent: f64,

    /// Index income by inflation from plan start
    #[serde(default)]
    pub inflate_income: bool,

    /// Index expenses by inflation from plan start
    #[serde(default)]
    pub inflate_expenses: bool,

    /// Age at which decumulation starts
    #[serde(default = "default_retirement_age")]
    pub retirement_age: u8,

    /// Monthly withdrawal from retirement on
    #[serde(default)]
    pub retirement_monthly_income: f64,

    /// Index the retirement withdrawal by inflation from the retirement
    /// month
    #[serde(default)]
    pub inflate_retirement_income: bool,
}

impl PlanSettings {
    /// Monthly contribution derived from the base cash flow:
    /// `max(0, income - expenses)`.
    pub fn derived_monthly_contribution(&self) -> f64 {
        (self.base_monthly_income - self.base_monthly_expenses).max(0.0)
    }

    /// Expected monthly return as a decimal rate.
    pub fn expected_monthly_return(&self) -> f64 {
        math::monthly_equivalent(math::percent_to_decimal(self.expected_annual_return_percent))
    }

    /// Assumed monthly inflation as a decimal rate.
    pub fn monthly_inflation(&self) -> f64 {
        math::monthly_equivalent(math::percent_to_decimal(self.annual_inflation_percent))
    }
}

/// A dated micro-plan revision superseding the base parameters from its
/// effective month onward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOverride {
    pub effective_from: TimePoint,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub monthly_contribution: f64,
}

/// A goal or event whose cash flow lands on the projection timeline.
///
/// `asset_value` arrives already signed by the caller (outflows negative);
/// `kind` is descriptive and never flips the sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledItem {
    /// Label used in diagnostics and reports
    #[serde(default)]
    pub name: String,

    pub kind: ItemKind,

    /// Total signed amount
    pub asset_value: f64,

    /// First occurrence month
    pub anchor: TimePoint,

    #[serde(default)]
    pub payment_mode: PaymentMode,

    /// Number of occurrences when `payment_mode` is not `none`
    #[serde(default = "default_installment_count")]
    pub installment_count: u32,

    /// Months between occurrences
    #[serde(default = "default_installment_interval")]
    pub installment_interval: u32,

    /// Scale each occurrence by inflation elapsed since the anchor
    #[serde(default)]
    pub adjust_for_inflation: bool,
}

/// One month of recorded ground truth. Supplied externally, never produced
/// or modified by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualRecord {
    pub time: TimePoint,
    pub starting_balance: f64,
    pub monthly_contribution: f64,
    pub monthly_return_rate_percent: f64,
    pub monthly_return_amount: f64,
    pub ending_balance: f64,
    #[serde(default)]
    pub target_return_rate_percent: f64,
}

/// Everything one projection request needs, bundled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientPlan {
    pub plan_id: u32,

    pub profile: ClientProfile,

    pub settings: PlanSettings,

    /// First month of the projection window
    pub start: TimePoint,

    /// Micro-plans; may arrive unsorted, the engine sorts once per run
    #[serde(default)]
    pub stage_overrides: Vec<StageOverride>,

    /// Goals and events
    #[serde(default)]
    pub scheduled_items: Vec<ScheduledItem>,

    /// Recorded history, sparse months allowed
    #[serde(default)]
    pub actuals: Vec<ActualRecord>,
}

impl ClientPlan {
    pub fn new(plan_id: u32, profile: ClientProfile, settings: PlanSettings, start: TimePoint) -> Self {
        Self {
            plan_id,
            profile,
            settings,
            start,
            stage_overrides: Vec::new(),
            scheduled_items: Vec::new(),
            actuals: Vec::new(),
        }
    }

    /// Latest recorded month, the historical/projected boundary.
    pub fn handoff(&self) -> Option<TimePoint> {
        self.actuals.iter().map(|a| a.time).max()
    }

    /// The month retirement starts.
    pub fn retirement_month(&self) -> TimePoint {
        self.profile.month_of_age(self.settings.retirement_age)
    }

    /// Last projected month under the profile's life expectancy.
    pub fn life_expectancy_month(&self) -> TimePoint {
        self.profile.month_of_age(self.profile.life_expectancy_years)
    }

    /// Reject inputs the engine would otherwise have to guess about.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.profile.life_expectancy_years == 0 {
            return Err(ConfigError::InvalidLifeExpectancy);
        }

        let times = std::iter::once(self.start)
            .chain(self.stage_overrides.iter().map(|o| o.effective_from))
            .chain(self.scheduled_items.iter().map(|i| i.anchor))
            .chain(self.actuals.iter().map(|a| a.time));
        for time in times {
            if !time.is_valid() {
                return Err(ConfigError::InvalidMonth {
                    year: time.year,
                    month: time.month,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_settings() -> PlanSettings {
        PlanSettings {
            starting_balance: 50_000.0,
            base_monthly_income: 8_000.0,
            base_monthly_expenses: 5_000.0,
            expected_annual_return_percent: 12.0,
            annual_inflation_percent: 4.0,
            inflate_income: false,
            inflate_expenses: false,
            retirement_age: 65,
            retirement_monthly_income: 6_000.0,
            inflate_retirement_income: false,
        }
    }

    fn sample_profile() -> ClientProfile {
        ClientProfile::new(NaiveDate::from_ymd_opt(1985, 6, 15).unwrap(), 90)
    }

    #[test]
    fn test_derived_contribution_floors_at_zero() {
        let mut settings = sample_settings();
        assert_eq!(settings.derived_monthly_contribution(), 3_000.0);

        settings.base_monthly_expenses = 9_500.0;
        assert_eq!(settings.derived_monthly_contribution(), 0.0);
    }

    #[test]
    fn test_expected_monthly_return_is_compounded() {
        let settings = sample_settings();
        let monthly = settings.expected_monthly_return();
        assert!((monthly - 0.009489).abs() < 1e-6);
    }

    #[test]
    fn test_profile_age_math() {
        let profile = sample_profile();

        assert_eq!(profile.birth_month(), TimePoint::new(1985, 6));
        assert_eq!(profile.month_of_age(65), TimePoint::new(2050, 6));
        // Age increments exactly at the birthday month.
        assert_eq!(profile.age_at(TimePoint::new(2050, 5)), 64);
        assert_eq!(profile.age_at(TimePoint::new(2050, 6)), 65);
        assert_eq!(profile.age_at(TimePoint::new(1985, 6)), 0);
    }

    #[test]
    fn test_handoff_is_latest_actual() {
        let mut plan = ClientPlan::new(1, sample_profile(), sample_settings(), TimePoint::new(2024, 1));
        assert_eq!(plan.handoff(), None);

        let record = |year, month| ActualRecord {
            time: TimePoint::new(year, month),
            starting_balance: 0.0,
            monthly_contribution: 0.0,
            monthly_return_rate_percent: 0.0,
            monthly_return_amount: 0.0,
            ending_balance: 0.0,
            target_return_rate_percent: 0.0,
        };
        plan.actuals = vec![record(2024, 5), record(2024, 2), record(2024, 3)];

        assert_eq!(plan.handoff(), Some(TimePoint::new(2024, 5)));
    }

    #[test]
    fn test_validate_rejects_bad_inputs() {
        let mut plan = ClientPlan::new(1, sample_profile(), sample_settings(), TimePoint::new(2024, 1));
        assert!(plan.validate().is_ok());

        plan.start = TimePoint { year: 2024, month: 0 };
        assert_eq!(
            plan.validate(),
            Err(ConfigError::InvalidMonth { year: 2024, month: 0 })
        );

        plan.start = TimePoint::new(2024, 1);
        plan.profile.life_expectancy_years = 0;
        assert_eq!(plan.validate(), Err(ConfigError::InvalidLifeExpectancy));
    }

    #[test]
    fn test_scheduled_item_deserializes_with_defaults() {
        let json = r#"{
            "kind": "goal",
            "asset_value": -12000.0,
            "anchor": { "year": 2026, "month": 3 }
        }"#;
        let item: ScheduledItem = serde_json::from_str(json).unwrap();

        assert_eq!(item.kind, ItemKind::Goal);
        assert_eq!(item.payment_mode, PaymentMode::None);
        assert_eq!(item.installment_count, 1);
        assert_eq!(item.installment_interval, 1);
        assert!(!item.adjust_for_inflation);
        assert!(item.name.is_empty());
    }
}
