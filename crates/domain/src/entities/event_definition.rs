//! EventDefinition entity - authored, day-gated occurrences
//!
//! Definitions are authored as flat [`EventDefinitionRecord`]s (the catalogue
//! file format) and validated into [`EventDefinition`]s. A definition that
//! fails validation never reaches the engine.

use serde::{Deserialize, Serialize};

use super::{EventChoice, EventEffect, QuestChainLink, QuestKind, QuestObjective, QuestSpec};
use super::TriggerCondition;
use crate::error::DomainError;
use crate::game_time::{delay_in_days, DayWindow, GameDay};
use crate::ids::{EventId, QuestChainId};

/// Dispatch priority. Ordering is total: Critical > High > Normal > Low.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum EventPriority {
    Low,
    #[default]
    Normal,
    High,
    /// Bypasses the probability roll once eligible
    Critical,
}

impl EventPriority {
    pub fn is_critical(&self) -> bool {
        matches!(self, EventPriority::Critical)
    }
}

/// What happens once the event fires.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// Player picks one; never empty
    Choices(Vec<EventChoice>),
    /// Applied immediately without a prompt
    Automatic(Vec<EventEffect>),
}

/// Event queued to fire a fixed number of days after this one completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUp {
    pub event_id: EventId,
    pub delay_days: u32,
}

impl FollowUp {
    pub fn target_day(&self, current_day: GameDay) -> GameDay {
        current_day.saturating_add(self.delay_days)
    }
}

// =============================================================================
// Authoring record
// =============================================================================

/// Flat on-disk form of an event definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDefinitionRecord {
    pub id: EventId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: EventPriority,
    #[serde(default)]
    pub min_day: GameDay,
    #[serde(default = "last_day")]
    pub max_day: GameDay,
    #[serde(default = "certain")]
    pub base_probability: f32,
    #[serde(default)]
    pub requires_choice: bool,
    #[serde(default)]
    pub can_repeat: bool,
    #[serde(default)]
    pub is_quest: bool,
    #[serde(default)]
    pub is_main_quest: bool,
    #[serde(default)]
    pub is_side_quest: bool,
    #[serde(default)]
    pub quest_chain_id: Option<QuestChainId>,
    #[serde(default)]
    pub quest_chain_order: u32,
    #[serde(default)]
    pub conditions: Vec<TriggerCondition>,
    #[serde(default)]
    pub choices: Vec<EventChoice>,
    #[serde(default)]
    pub effects: Vec<EventEffect>,
    #[serde(default)]
    pub follow_up_event_id: Option<EventId>,
    #[serde(default)]
    pub follow_up_delay_days: f32,
    #[serde(default)]
    pub objectives: Vec<QuestObjective>,
}

fn last_day() -> GameDay {
    GameDay::MAX
}

fn certain() -> f32 {
    1.0
}

impl EventDefinitionRecord {
    /// A record with every optional field at its authoring default.
    pub fn new(id: impl Into<EventId>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            description: String::new(),
            priority: EventPriority::Normal,
            min_day: 0,
            max_day: last_day(),
            base_probability: certain(),
            requires_choice: false,
            can_repeat: false,
            is_quest: false,
            is_main_quest: false,
            is_side_quest: false,
            quest_chain_id: None,
            quest_chain_order: 0,
            conditions: Vec::new(),
            choices: Vec::new(),
            effects: Vec::new(),
            follow_up_event_id: None,
            follow_up_delay_days: 0.0,
            objectives: Vec::new(),
        }
    }
}

// =============================================================================
// Validated definition
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct EventDefinition {
    id: EventId,
    name: String,
    description: String,
    priority: EventPriority,
    window: DayWindow,
    base_probability: f32,
    can_repeat: bool,
    conditions: Vec<TriggerCondition>,
    outcome: EventOutcome,
    follow_up: Option<FollowUp>,
    quest: Option<QuestSpec>,
}

impl TryFrom<EventDefinitionRecord> for EventDefinition {
    type Error = DomainError;

    fn try_from(record: EventDefinitionRecord) -> Result<Self, Self::Error> {
        let id = record.id;
        let fail = |reason: String| DomainError::authoring(id.as_str(), reason);

        if id.is_empty() {
            return Err(DomainError::authoring("<blank>", "event id is empty"));
        }

        let window = DayWindow::new(record.min_day, record.max_day)
            .map_err(|_| fail(format!("minDay {} is after maxDay {}", record.min_day, record.max_day)))?;

        if !(0.0..=1.0).contains(&record.base_probability) {
            return Err(fail(format!(
                "baseProbability {} is outside [0, 1]",
                record.base_probability
            )));
        }

        if record.requires_choice && record.choices.is_empty() {
            return Err(fail("requiresChoice is set but no choices are authored".into()));
        }

        let follow_up = match record.follow_up_event_id {
            Some(event_id) => {
                let delay_days = delay_in_days(record.follow_up_delay_days)
                    .map_err(|e| fail(e.to_string()))?;
                Some(FollowUp {
                    event_id,
                    delay_days,
                })
            }
            None => None,
        };

        let is_quest = record.is_quest || record.is_main_quest || record.is_side_quest;
        if record.is_main_quest && record.is_side_quest {
            return Err(fail("a quest cannot be both main and side".into()));
        }
        if !is_quest && (record.quest_chain_id.is_some() || !record.objectives.is_empty()) {
            return Err(fail("quest fields are set on a non-quest event".into()));
        }
        for (i, objective) in record.objectives.iter().enumerate() {
            if record.objectives[..i].iter().any(|o| o.id == objective.id) {
                return Err(fail(format!("duplicate objective id '{}'", objective.id)));
            }
        }

        // Quest effects are completion rewards, not resolution effects.
        let (quest, automatic) = if is_quest {
            let kind = if record.is_main_quest {
                QuestKind::Main
            } else {
                QuestKind::Side
            };
            let chain = record.quest_chain_id.map(|chain_id| QuestChainLink {
                chain_id,
                order: record.quest_chain_order,
            });
            let spec = QuestSpec {
                kind,
                chain,
                objectives: record.objectives,
                rewards: record.effects,
            };
            (Some(spec), Vec::new())
        } else {
            (None, record.effects)
        };

        let outcome = if record.requires_choice {
            EventOutcome::Choices(record.choices)
        } else {
            EventOutcome::Automatic(automatic)
        };

        Ok(Self {
            id,
            name: record.name,
            description: record.description,
            priority: record.priority,
            window,
            base_probability: record.base_probability,
            can_repeat: record.can_repeat,
            conditions: record.conditions,
            outcome,
            follow_up,
            quest,
        })
    }
}

impl EventDefinition {
    // =========================================================================
    // Identity Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> &EventId {
        &self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    // =========================================================================
    // Scheduling Accessors
    // =========================================================================

    #[inline]
    pub fn priority(&self) -> EventPriority {
        self.priority
    }

    #[inline]
    pub fn window(&self) -> DayWindow {
        self.window
    }

    #[inline]
    pub fn base_probability(&self) -> f32 {
        self.base_probability
    }

    #[inline]
    pub fn can_repeat(&self) -> bool {
        self.can_repeat
    }

    pub fn conditions(&self) -> &[TriggerCondition] {
        &self.conditions
    }

    pub fn follow_up(&self) -> Option<&FollowUp> {
        self.follow_up.as_ref()
    }

    // =========================================================================
    // Outcome Accessors
    // =========================================================================

    pub fn outcome(&self) -> &EventOutcome {
        &self.outcome
    }

    pub fn requires_choice(&self) -> bool {
        matches!(self.outcome, EventOutcome::Choices(_))
    }

    /// Choices offered to the player; empty for automatic events.
    pub fn choices(&self) -> &[EventChoice] {
        match &self.outcome {
            EventOutcome::Choices(choices) => choices,
            EventOutcome::Automatic(_) => &[],
        }
    }

    /// Effects applied on resolution when no choice is required.
    pub fn automatic_effects(&self) -> &[EventEffect] {
        match &self.outcome {
            EventOutcome::Automatic(effects) => effects,
            EventOutcome::Choices(_) => &[],
        }
    }

    // =========================================================================
    // Quest Accessors
    // =========================================================================

    pub fn quest(&self) -> Option<&QuestSpec> {
        self.quest.as_ref()
    }

    pub fn is_quest(&self) -> bool {
        self.quest.is_some()
    }

    pub fn is_main_quest(&self) -> bool {
        self.quest.as_ref().is_some_and(|q| q.kind == QuestKind::Main)
    }

    pub fn is_side_quest(&self) -> bool {
        self.quest.as_ref().is_some_and(|q| q.kind == QuestKind::Side)
    }
}
