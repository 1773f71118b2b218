//! Narrative use cases - daily event selection, choices and follow-ups.

pub mod chance;
pub mod engine;
pub mod follow_ups;
pub mod report;


pub use chance::{
    ChanceContext, ChanceTrace, ConditionalModifier, DifficultyModifier, TriggerChance,
    TriggerChanceModifier, WeightFactor,
};
pub use engine::{EngineError, EnginePhase, EventEngine};
pub use follow_ups::FollowUpQueue;
pub use report::{DayReport, DayStep, DispatchRecord, DispatchSource, PendingChoice, Resolution};
