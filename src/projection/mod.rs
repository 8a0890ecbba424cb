//! Projection engine for single plans and the shared output types

mod engine;
mod output;
mod state;

pub use engine::{ProjectionConfig, ProjectionEngine};
pub use output::{ProjectionMonth, ProjectionResult, ProjectionSummary, ProjectionYear};
pub use state::{Phase, ProjectionState};
