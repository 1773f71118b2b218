//! Authored event content and quest state.

mod choice;
mod condition;
mod effect;
mod event_definition;
mod quest;
mod resource;

pub use choice::EventChoice;
pub use condition::TriggerCondition;
pub use effect::EventEffect;
pub use event_definition::{
    EventDefinition, EventDefinitionRecord, EventOutcome, EventPriority, FollowUp,
};
pub use quest::{
    ObjectiveProgress, ObjectiveType, QuestChainLink, QuestKind, QuestObjective, QuestRecord,
    QuestSpec, QuestStatus,
};
pub use resource::{ResourceKind, ResourceRequirement};
