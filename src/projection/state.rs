//! Running state for a single plan projection

use crate::plan::ClientPlan;

/// Phase of the trajectory state machine.
///
/// Transitions only move forward: historical months precede projected
/// ones, and the decumulation switch never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Historical,
    Accumulation,
    Decumulation,
}

/// State carried across months of one projection
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Net worth carried into the next month
    pub balance: f64,

    /// No-intervention baseline balance, advanced in parallel
    pub planned_balance: f64,

    /// Current phase; moves forward only
    pub phase: Phase,
}

impl ProjectionState {
    /// Initialize state at plan start. Both tracks open at the plan's
    /// starting balance; historical records overwrite the main track as
    /// they are emitted.
    pub fn from_plan(plan: &ClientPlan) -> Self {
        Self {
            balance: plan.settings.starting_balance,
            planned_balance: plan.settings.starting_balance,
            phase: Phase::Historical,
        }
    }

    /// Move the phase machine forward. Requests to go backward are
    /// ignored, keeping the Historical -> Accumulation -> Decumulation
    /// order monotonic.
    pub fn advance_to(&mut self, phase: Phase) {
        if phase > self.phase {
            self.phase = phase;
        }
    }
}
