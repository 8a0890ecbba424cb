//! Cash-flow scheduling and micro-plan resolution

pub mod cashflow;
pub mod stages;

pub use cashflow::{expand, expand_within, schedule_issue, Occurrence};
pub use stages::{resolve, sort_overrides, EffectiveStage};
