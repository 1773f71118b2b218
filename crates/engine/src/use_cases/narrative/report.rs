//! What happened during one day cycle.

use lastlight_domain::{ChoiceTicketId, EventId, GameDay, ScheduledEvent};

use super::chance::ChanceTrace;
use crate::entities::{EffectExecutionSummary, QuestCompletion, QuestTransition};
use crate::infrastructure::ports::ChoiceOption;

/// Why an event was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchSource {
    /// A scheduled follow-up whose target day arrived
    FollowUp,
    /// A critical event, dispatched without a roll
    Critical,
    /// A non-critical event that won its probability roll
    Rolled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Automatic,
    Chose(usize),
    /// The host cancelled the choice; nothing was applied
    Abandoned,
    /// A follow-up whose conditions failed on its target day
    SkippedConditions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRecord {
    pub event_id: EventId,
    pub source: DispatchSource,
    pub resolution: Resolution,
    pub effects: Option<EffectExecutionSummary>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DayReport {
    pub day: GameDay,
    pub dispatches: Vec<DispatchRecord>,
    pub chance_traces: Vec<ChanceTrace>,
    pub quest_transitions: Vec<QuestTransition>,
    pub quest_rewards: Vec<EffectExecutionSummary>,
    /// Follow-ups queued during this cycle
    pub scheduled: Vec<ScheduledEvent>,
}

impl DayReport {
    pub fn new(day: GameDay) -> Self {
        Self {
            day,
            ..Default::default()
        }
    }

    /// Events that actually ran (automatic or chosen).
    pub fn fired(&self) -> impl Iterator<Item = &EventId> {
        self.dispatches
            .iter()
            .filter(|d| matches!(d.resolution, Resolution::Automatic | Resolution::Chose(_)))
            .map(|d| &d.event_id)
    }

    pub(crate) fn absorb_quest_completions(&mut self, completions: Vec<QuestCompletion>) {
        for (transition, rewards) in completions {
            self.quest_transitions.push(transition);
            self.quest_rewards.push(rewards);
        }
    }
}

/// The dialog the host must render before the day can continue.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingChoice {
    pub ticket: ChoiceTicketId,
    pub event_id: EventId,
    pub title: String,
    pub description: String,
    pub options: Vec<ChoiceOption>,
}

/// Where the engine stopped after a step.
#[derive(Debug, Clone, PartialEq)]
pub enum DayStep {
    /// Suspended until `submit_choice` or `cancel_choice`
    AwaitingChoice(PendingChoice),
    /// The day cycle ran to completion
    Completed(DayReport),
}
