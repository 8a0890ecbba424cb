//! Client plans: profile, settings, micro-plans, scheduled items, actuals

mod data;
pub mod loader;

pub use data::{
    ActualRecord, ClientPlan, ClientProfile, ItemKind, PaymentMode, PlanSettings, ScheduledItem,
    StageOverride,
};
