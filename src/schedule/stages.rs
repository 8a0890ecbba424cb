//! Resolves which plan parameters are active for a given month

use crate::plan::{PlanSettings, StageOverride};
use crate::timepoint::TimePoint;

/// The income/expense/contribution set in effect for one month
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveStage {
    pub income: f64,
    pub expenses: f64,
    pub contribution: f64,
}

impl EffectiveStage {
    /// Stage carrying the base plan values, contribution derived.
    pub fn from_base(settings: &PlanSettings) -> Self {
        Self {
            income: settings.base_monthly_income,
            expenses: settings.base_monthly_expenses,
            contribution: settings.derived_monthly_contribution(),
        }
    }

    fn from_override(o: &StageOverride) -> Self {
        Self {
            income: o.monthly_income,
            expenses: o.monthly_expenses,
            contribution: o.monthly_contribution,
        }
    }
}

/// Sort micro-plans ascending by effective month. `resolve` requires this
/// order; the engine sorts once per projection.
pub fn sort_overrides(overrides: &mut [StageOverride]) {
    overrides.sort_by_key(|o| o.effective_from);
}

/// The last override with `effective_from <= at` wins; the base plan
/// applies when none qualifies.
///
/// Pure binary search over the sorted slice. No state survives between
/// calls, so months may be resolved in any order.
pub fn resolve(at: TimePoint, base: &PlanSettings, sorted_overrides: &[StageOverride]) -> EffectiveStage {
    let idx = sorted_overrides.partition_point(|o| o.effective_from <= at);
    if idx == 0 {
        EffectiveStage::from_base(base)
    } else {
        EffectiveStage::from_override(&sorted_overrides[idx - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> PlanSettings {
        PlanSettings {
            starting_balance: 0.0,
            base_monthly_income: 8_000.0,
            base_monthly_expenses: 5_000.0,
            expected_annual_return_percent: 10.0,
            annual_inflation_percent: 4.0,
            inflate_income: false,
            inflate_expenses: false,
            retirement_age: 65,
            retirement_monthly_income: 0.0,
            inflate_retirement_income: false,
        }
    }

    fn override_at(year: i32, month: u32, income: f64) -> StageOverride {
        StageOverride {
            effective_from: TimePoint::new(year, month),
            monthly_income: income,
            monthly_expenses: 4_000.0,
            monthly_contribution: income - 4_000.0,
        }
    }

    #[test]
    fn test_precedence_between_overrides() {
        let mut overrides = vec![override_at(2025, 8, 12_000.0), override_at(2024, 10, 10_000.0)];
        sort_overrides(&mut overrides);

        // Before any override: base plan.
        let stage = resolve(TimePoint::new(2024, 5), &base(), &overrides);
        assert_eq!(stage.income, 8_000.0);
        assert_eq!(stage.contribution, 3_000.0);

        // Between the two: the earlier override.
        let stage = resolve(TimePoint::new(2025, 3), &base(), &overrides);
        assert_eq!(stage.income, 10_000.0);

        // After both: the later override.
        let stage = resolve(TimePoint::new(2025, 9), &base(), &overrides);
        assert_eq!(stage.income, 12_000.0);
    }

    #[test]
    fn test_override_active_from_its_effective_month() {
        let overrides = vec![override_at(2025, 6, 11_000.0)];

        let before = resolve(TimePoint::new(2025, 5), &base(), &overrides);
        assert_eq!(before.income, 8_000.0);

        let exact = resolve(TimePoint::new(2025, 6), &base(), &overrides);
        assert_eq!(exact.income, 11_000.0);
    }

    #[test]
    fn test_duplicate_effective_month_keeps_later_entry() {
        let mut overrides = vec![override_at(2025, 6, 11_000.0), override_at(2025, 6, 13_000.0)];
        sort_overrides(&mut overrides);

        let stage = resolve(TimePoint::new(2025, 7), &base(), &overrides);
        assert_eq!(stage.income, 13_000.0);
    }

    #[test]
    fn test_no_overrides_uses_base() {
        let stage = resolve(TimePoint::new(2030, 1), &base(), &[]);
        assert_eq!(stage.income, 8_000.0);
        assert_eq!(stage.expenses, 5_000.0);
        assert_eq!(stage.contribution, 3_000.0);
    }

    #[test]
    fn test_override_contribution_taken_as_given() {
        let overrides = vec![StageOverride {
            effective_from: TimePoint::new(2025, 1),
            monthly_income: 10_000.0,
            monthly_expenses: 6_000.0,
            monthly_contribution: 2_500.0, // deliberate, not income - expenses
        }];

        let stage = resolve(TimePoint::new(2025, 2), &base(), &overrides);
        assert_eq!(stage.contribution, 2_500.0);
    }
}
