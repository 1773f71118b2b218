//! Entity modules - Domain capability encapsulation.
//!
//! Each module wraps operations over authored content and the collaborator
//! ports. They provide the building blocks for the event engine use case.

pub mod catalogue;
pub mod conditions;
pub mod effects;
pub mod quests;
pub mod requirements;

pub use catalogue::{CatalogueError, EventCatalogue, RejectedDefinition};
pub use conditions::ConditionEvaluator;
pub use effects::{EffectExecutionResult, EffectExecutionSummary, EffectExecutor};
pub use quests::{QuestCompletion, QuestError, QuestTracker, QuestTransition};
pub use requirements::{RequirementChecker, RequirementError};
