//! Use cases - orchestration across entity modules.

pub mod narrative;

pub use narrative::{DayReport, DayStep, EngineError, EventEngine, PendingChoice};
