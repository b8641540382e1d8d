// Library interface for planrs modules
// This allows the binary and integration tests to share the core functionality

pub mod chart;
pub mod config;
pub mod error;
pub mod expand;
pub mod interactive;
pub mod loader;
pub mod logging;
pub mod models;
pub mod plan;
pub mod tss;
pub mod validation;
pub mod zones;

// Re-export commonly used types for convenience
pub use models::*;
pub use expand::{atomic_intervals, IntervalExpander};
pub use tss::TssCalculator;
pub use plan::PlanWriter;
pub use validation::{ValidationIssue, ValidationReport, WorkoutValidator};
pub use error::{PlanError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
