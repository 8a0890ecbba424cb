//! Wealth Engine - Monthly wealth projection for personal financial plans
//!
//! This library provides:
//! - Single and batch plan projections across accumulation and retirement
//! - Recorded-history handoff: projected months resume from actual balances
//! - Scheduled goals and events expanded into monthly cash flows
//! - Stage overrides for income/expense changes over time
//! - Market indicator series with competence-based rate lookups

pub mod error;
pub mod plan;
pub mod projection;
pub mod rates;
pub mod scenario;
pub mod schedule;
pub mod timepoint;

// Re-export commonly used types
pub use error::{ConfigError, Diagnostic};
pub use plan::{ClientPlan, ClientProfile, PlanSettings, ScheduledItem, StageOverride};
pub use projection::{ProjectionConfig, ProjectionEngine, ProjectionMonth, ProjectionResult};
pub use rates::{Indicators, RateSeries};
pub use scenario::ScenarioRunner;
pub use timepoint::TimePoint;
