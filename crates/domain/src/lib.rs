pub mod entities;
pub mod error;
pub mod game_time;
pub mod ids;
pub mod snapshot;

pub use entities::{
    EventChoice, EventDefinition, EventDefinitionRecord, EventEffect, EventOutcome, EventPriority,
    FollowUp, ObjectiveProgress, ObjectiveType, QuestChainLink, QuestKind, QuestObjective,
    QuestRecord, QuestSpec, QuestStatus, ResourceKind, ResourceRequirement, TriggerCondition,
};

pub use error::DomainError;

pub use game_time::{delay_in_days, DayWindow, GameDay};

pub use ids::{ChoiceTicketId, EventId, FlagId, ItemId, MemberId, ObjectiveId, QuestChainId};

pub use snapshot::{EngineSnapshot, ScheduledEvent};
