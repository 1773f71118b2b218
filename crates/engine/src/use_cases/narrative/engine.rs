//! Event engine - daily evaluation, selection and the choice pipeline.
//!
//! One day cycle runs `Idle → Evaluating → (Resolved | AwaitingChoice) →
//! Completing → Idle`. Evaluating and Completing are synchronous; the cycle
//! only suspends in AwaitingChoice, until the host calls
//! [`EventEngine::submit_choice`] or [`EventEngine::cancel_choice`].
//!
//! Per cycle:
//! 1. Quest availability and SurviveDays objectives advance.
//! 2. Follow-ups due today dispatch, highest priority first. They skip the
//!    window, probability and already-triggered checks but still need their
//!    conditions to hold.
//! 3. Selection: the first eligible critical event dispatches without a roll.
//!    Otherwise non-critical candidates are rolled in priority order and the
//!    first success dispatches.

use std::cmp::Reverse;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use lastlight_domain::{
    ChoiceTicketId, EngineSnapshot, EventDefinition, EventId, EventPriority, GameDay,
    ObjectiveType, ScheduledEvent,
};

use super::chance::{ChanceContext, TriggerChance};
use super::follow_ups::FollowUpQueue;
use super::report::{DayReport, DayStep, DispatchRecord, DispatchSource, PendingChoice, Resolution};
use crate::entities::{
    ConditionEvaluator, EffectExecutionSummary, EffectExecutor, EventCatalogue, QuestCompletion,
    QuestError, QuestTracker, QuestTransition, RequirementChecker, RequirementError,
};
use crate::infrastructure::ports::{
    ChoiceOption, ChoiceResponse, Collaborators, PresentationPort, RandomPort,
};

/// How many times `run_day` re-presents a choice the pool cannot cover
/// before treating it as cancelled.
const MAX_REPROMPTS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("A choice for event {0} is still pending")]
    ChoicePending(EventId),

    #[error("No choice is pending")]
    NoPendingChoice,

    #[error("Choice ticket {0} is stale")]
    StaleTicket(ChoiceTicketId),

    #[error("Event {event_id} has no choice {index}")]
    InvalidChoice { event_id: EventId, index: usize },

    /// Commit-time recheck failed; the choice is still pending.
    #[error(transparent)]
    Requirement(#[from] RequirementError),

    #[error("Unknown event: {0}")]
    UnknownEvent(EventId),

    #[error(transparent)]
    Quest(#[from] QuestError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl EngineError {
    /// The engine is still awaiting the same choice after this error.
    pub fn keeps_choice_pending(&self) -> bool {
        matches!(
            self,
            EngineError::Requirement(_) | EngineError::InvalidChoice { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    Idle,
    Evaluating,
    AwaitingChoice,
    Completing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Dispatch {
    event_id: EventId,
    source: DispatchSource,
    /// Day the dispatch was due (follow-ups keep their original target)
    target_day: GameDay,
}

#[derive(Debug, Clone)]
struct PendingDispatch {
    ticket: ChoiceTicketId,
    dispatch: Dispatch,
}

/// Per-day bookkeeping so re-evaluating the same day cannot exceed its limits.
#[derive(Debug, Clone, Copy)]
struct DayLedger {
    day: GameDay,
    selection_done: bool,
}

pub struct EventEngine {
    catalogue: Arc<EventCatalogue>,
    world: Collaborators,
    conditions: ConditionEvaluator,
    requirements: RequirementChecker,
    executor: Arc<EffectExecutor>,
    quests: QuestTracker,
    chance: TriggerChance,
    random: Arc<dyn RandomPort>,

    follow_ups: FollowUpQueue,
    triggered: BTreeMap<EventId, bool>,
    phase: EnginePhase,
    ledger: Option<DayLedger>,
    agenda: VecDeque<Dispatch>,
    pending: Option<PendingDispatch>,
    report: Option<DayReport>,
}

impl EventEngine {
    pub fn new(
        catalogue: Arc<EventCatalogue>,
        world: Collaborators,
        executor: Arc<EffectExecutor>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        let quests = QuestTracker::new(catalogue.clone(), executor.clone(), world.clone());
        Self {
            conditions: ConditionEvaluator::new(world.clone()),
            requirements: RequirementChecker::new(world.clone()),
            catalogue,
            world,
            executor,
            quests,
            chance: TriggerChance::new(),
            random,
            follow_ups: FollowUpQueue::new(),
            triggered: BTreeMap::new(),
            phase: EnginePhase::Idle,
            ledger: None,
            agenda: VecDeque::new(),
            pending: None,
            report: None,
        }
    }

    pub fn with_trigger_chance(mut self, chance: TriggerChance) -> Self {
        self.chance = chance;
        self
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn current_day(&self) -> Option<GameDay> {
        self.ledger.map(|l| l.day)
    }

    pub fn catalogue(&self) -> &EventCatalogue {
        &self.catalogue
    }

    pub fn quests(&self) -> &QuestTracker {
        &self.quests
    }

    pub fn was_triggered(&self, id: &EventId) -> bool {
        self.triggered.get(id).copied().unwrap_or(false)
    }

    pub fn scheduled(&self) -> Vec<ScheduledEvent> {
        self.follow_ups.entries()
    }

    /// Window, conditions, the already-triggered set and the quest gate.
    pub fn is_candidate(&self, definition: &EventDefinition, day: GameDay) -> bool {
        (definition.can_repeat() || !self.was_triggered(definition.id()))
            && self.quests.can_start(definition)
            && self.conditions.is_eligible(definition, day)
    }

    /// Candidate ids for `day`, in authoring order.
    pub fn candidates(&self, day: GameDay) -> Vec<EventId> {
        self.catalogue
            .iter()
            .filter(|d| self.is_candidate(d, day))
            .map(|d| d.id().clone())
            .collect()
    }

    /// The dialog for the pending choice, with affordability re-read now.
    pub fn pending_choice(&self) -> Option<PendingChoice> {
        let pending = self.pending.as_ref()?;
        let definition = self.catalogue.get(&pending.dispatch.event_id)?;
        Some(self.describe_choice(definition, pending.ticket))
    }

    // =========================================================================
    // Day cycle
    // =========================================================================

    /// Handle a "day advanced" signal.
    pub fn advance_day(&mut self, day: GameDay) -> Result<DayStep, EngineError> {
        if let Some(pending) = &self.pending {
            return Err(EngineError::ChoicePending(pending.dispatch.event_id.clone()));
        }

        let elapsed = match self.ledger {
            Some(ledger) if day > ledger.day => day - ledger.day,
            _ => 0,
        };
        if self.ledger.map_or(true, |l| l.day != day) {
            self.ledger = Some(DayLedger {
                day,
                selection_done: false,
            });
        }

        self.phase = EnginePhase::Evaluating;
        let mut report = DayReport::new(day);
        tracing::debug!(day = day, elapsed = elapsed, "Evaluating day");

        if elapsed > 0 {
            let completions = self.quests.advance_survival_days(elapsed);
            report.absorb_quest_completions(completions);
        }
        report
            .quest_transitions
            .extend(self.quests.refresh_availability(day));

        let catalogue = Arc::clone(&self.catalogue);
        let due = self.follow_ups.take_due(day, |id| rank(&catalogue, id));
        for entry in due {
            self.agenda.push_back(Dispatch {
                event_id: entry.event_id,
                source: DispatchSource::FollowUp,
                target_day: entry.target_day,
            });
        }

        self.report = Some(report);
        self.run_agenda()
    }

    /// Deliver the player's pick for the pending choice.
    ///
    /// If the commit-time recheck fails the choice stays pending and the
    /// InsufficientResources error is returned; the host re-prompts.
    pub fn submit_choice(
        &mut self,
        ticket: ChoiceTicketId,
        index: usize,
    ) -> Result<DayStep, EngineError> {
        let event_id = self.check_ticket(ticket)?;
        let catalogue = Arc::clone(&self.catalogue);
        let definition = catalogue
            .get(&event_id)
            .ok_or_else(|| EngineError::UnknownEvent(event_id.clone()))?;
        let choice = definition
            .choices()
            .get(index)
            .ok_or_else(|| EngineError::InvalidChoice {
                event_id: event_id.clone(),
                index,
            })?;

        if let Err(error) = self.requirements.commit(choice) {
            tracing::warn!(
                event_id = %event_id,
                choice = index,
                error = %error,
                "Choice rejected at commit, awaiting another pick"
            );
            return Err(error.into());
        }

        let Some(pending) = self.pending.take() else {
            return Err(EngineError::NoPendingChoice);
        };
        tracing::info!(event_id = %event_id, choice = index, "Choice committed");

        let summary = self
            .executor
            .execute(definition.id(), definition.name(), &choice.text, &choice.effects);
        self.complete(
            definition,
            pending.dispatch,
            Resolution::Chose(index),
            Some(summary),
            &choice.result_text,
        );
        self.run_agenda()
    }

    /// Abandon the pending choice without side effects and finish the day.
    pub fn cancel_choice(&mut self, ticket: ChoiceTicketId) -> Result<DayStep, EngineError> {
        self.check_ticket(ticket)?;
        let Some(pending) = self.pending.take() else {
            return Err(EngineError::NoPendingChoice);
        };
        tracing::info!(event_id = %pending.dispatch.event_id, "Choice cancelled, event abandoned");
        self.record(DispatchRecord {
            event_id: pending.dispatch.event_id,
            source: pending.dispatch.source,
            resolution: Resolution::Abandoned,
            effects: None,
        });
        self.phase = EnginePhase::Evaluating;
        self.run_agenda()
    }

    /// Drive a full day, awaiting the presenter for every choice.
    pub async fn run_day(
        &mut self,
        day: GameDay,
        presenter: &dyn PresentationPort,
    ) -> Result<DayReport, EngineError> {
        let mut step = self.advance_day(day)?;
        let mut reprompts = 0;
        loop {
            let pending = match step {
                DayStep::Completed(report) => return Ok(report),
                DayStep::AwaitingChoice(pending) => pending,
            };

            let response = presenter
                .present_choices(&pending.event_id, pending.ticket, &pending.options)
                .await;

            step = match response {
                ChoiceResponse::Selected(index) => {
                    match self.submit_choice(pending.ticket, index) {
                        Ok(next) => {
                            reprompts = 0;
                            next
                        }
                        Err(error) if error.keeps_choice_pending() && reprompts < MAX_REPROMPTS => {
                            reprompts += 1;
                            match self.pending_choice() {
                                Some(again) => DayStep::AwaitingChoice(again),
                                None => return Err(EngineError::NoPendingChoice),
                            }
                        }
                        Err(error) if error.keeps_choice_pending() => {
                            tracing::warn!(
                                event_id = %pending.event_id,
                                "Giving up on choice after repeated rejections"
                            );
                            reprompts = 0;
                            self.cancel_choice(pending.ticket)?
                        }
                        Err(error) => return Err(error),
                    }
                }
                ChoiceResponse::Cancelled => {
                    reprompts = 0;
                    self.cancel_choice(pending.ticket)?
                }
            };
        }
    }

    // =========================================================================
    // External quest signals
    // =========================================================================

    /// Item pickup, enemy kill, area entry and similar gameplay signals.
    pub fn record_progress(
        &mut self,
        objective_type: ObjectiveType,
        target_id: &str,
        amount: u32,
    ) -> Vec<QuestCompletion> {
        self.quests.update_progress(objective_type, target_id, amount)
    }

    pub fn fail_quest(&mut self, id: &EventId) -> Result<QuestTransition, EngineError> {
        Ok(self.quests.fail_quest(id)?)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Triggered set, quest table and scheduled queue.
    ///
    /// A pending choice is not saved. Follow-ups already pulled into today's
    /// agenda but not yet dispatched are saved as scheduled for their day.
    pub fn snapshot(&self) -> EngineSnapshot {
        let mut scheduled = self.follow_ups.entries();
        scheduled.extend(
            self.agenda
                .iter()
                .filter(|d| d.source == DispatchSource::FollowUp)
                .map(|d| ScheduledEvent {
                    event_id: d.event_id.clone(),
                    target_day: d.target_day,
                }),
        );
        EngineSnapshot {
            day: self.current_day(),
            triggered: self.triggered.clone(),
            quests: self.quests.records().clone(),
            scheduled,
        }
    }

    /// Replace engine state from a snapshot. Any pending choice is abandoned.
    pub fn restore(&mut self, snapshot: &EngineSnapshot) {
        if let Some(pending) = self.pending.take() {
            tracing::info!(
                event_id = %pending.dispatch.event_id,
                "Discarding pending choice on restore"
            );
        }
        self.agenda.clear();
        self.report = None;
        self.phase = EnginePhase::Idle;

        self.triggered = snapshot.triggered.clone();
        self.quests.restore(&snapshot.quests);
        self.follow_ups = FollowUpQueue::from_entries(snapshot.scheduled.iter().filter_map(|entry| {
            if self.catalogue.contains(&entry.event_id) {
                Some(entry.clone())
            } else {
                tracing::warn!(event_id = %entry.event_id, "Dropping scheduled event not in catalogue");
                None
            }
        }));
        // The saved day counts as fully evaluated.
        self.ledger = snapshot.day.map(|day| DayLedger {
            day,
            selection_done: true,
        });
        tracing::info!(
            day = ?snapshot.day,
            triggered = self.triggered.len(),
            scheduled = self.follow_ups.len(),
            "Restored engine state"
        );
    }

    pub fn snapshot_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    pub fn restore_json(&mut self, json: &str) -> Result<(), EngineError> {
        let snapshot: EngineSnapshot = serde_json::from_str(json)?;
        self.restore(&snapshot);
        Ok(())
    }

    // =========================================================================
    // Pipeline internals
    // =========================================================================

    fn today(&self) -> GameDay {
        self.ledger.map(|l| l.day).unwrap_or_default()
    }

    fn check_ticket(&self, ticket: ChoiceTicketId) -> Result<EventId, EngineError> {
        let pending = self.pending.as_ref().ok_or(EngineError::NoPendingChoice)?;
        if pending.ticket != ticket {
            return Err(EngineError::StaleTicket(ticket));
        }
        Ok(pending.dispatch.event_id.clone())
    }

    fn run_agenda(&mut self) -> Result<DayStep, EngineError> {
        loop {
            if let Some(dispatch) = self.agenda.pop_front() {
                if let Some(pending) = self.dispatch(dispatch) {
                    return Ok(DayStep::AwaitingChoice(pending));
                }
                continue;
            }

            match self.ledger.as_mut() {
                Some(ledger) if !ledger.selection_done => ledger.selection_done = true,
                _ => break,
            }
            if let Some(dispatch) = self.select() {
                self.agenda.push_back(dispatch);
            }
        }

        self.phase = EnginePhase::Idle;
        let report = self
            .report
            .take()
            .unwrap_or_else(|| DayReport::new(self.today()));
        tracing::info!(
            day = report.day,
            fired = report.fired().count(),
            rolls = report.chance_traces.len(),
            quest_updates = report.quest_transitions.len(),
            "Day cycle complete"
        );
        Ok(DayStep::Completed(report))
    }

    fn select(&mut self) -> Option<Dispatch> {
        let day = self.today();
        let catalogue = Arc::clone(&self.catalogue);
        let candidates: Vec<&EventDefinition> = catalogue
            .iter()
            .filter(|d| self.is_candidate(d, day))
            .collect();

        if let Some(critical) = candidates.iter().find(|d| d.priority().is_critical()) {
            return Some(Dispatch {
                event_id: critical.id().clone(),
                source: DispatchSource::Critical,
                target_day: day,
            });
        }

        let mut ordered = candidates;
        ordered.sort_by_key(|d| Reverse(d.priority()));

        let context = ChanceContext {
            day,
            conditions: &self.conditions,
        };
        for definition in ordered {
            let trace = self.chance.roll(definition, &context, self.random.roll());
            tracing::debug!(
                event_id = %trace.event_id,
                effective = trace.effective,
                roll = trace.roll,
                fired = trace.fired,
                "Rolled trigger chance"
            );
            let fired = trace.fired;
            if let Some(report) = self.report.as_mut() {
                report.chance_traces.push(trace);
            }
            if fired {
                return Some(Dispatch {
                    event_id: definition.id().clone(),
                    source: DispatchSource::Rolled,
                    target_day: day,
                });
            }
        }
        None
    }

    /// Returns the dialog to show when the event needs a choice.
    fn dispatch(&mut self, dispatch: Dispatch) -> Option<PendingChoice> {
        let day = self.today();
        let catalogue = Arc::clone(&self.catalogue);
        let Some(definition) = catalogue.get(&dispatch.event_id) else {
            tracing::warn!(event_id = %dispatch.event_id, "Dispatch for unknown event dropped");
            return None;
        };

        if dispatch.source == DispatchSource::FollowUp
            && !(self.conditions.conditions_hold(definition, day)
                && self.quests.can_start(definition))
        {
            tracing::info!(
                event_id = %dispatch.event_id,
                day = day,
                "Follow-up conditions unmet, skipping"
            );
            self.record(DispatchRecord {
                event_id: dispatch.event_id,
                source: dispatch.source,
                resolution: Resolution::SkippedConditions,
                effects: None,
            });
            return None;
        }

        tracing::info!(
            event_id = %dispatch.event_id,
            day = day,
            source = ?dispatch.source,
            priority = ?definition.priority(),
            "Dispatching event"
        );

        if definition.requires_choice() {
            let ticket = ChoiceTicketId::new();
            self.phase = EnginePhase::AwaitingChoice;
            self.pending = Some(PendingDispatch { ticket, dispatch });
            return Some(self.describe_choice(definition, ticket));
        }

        let summary = self.executor.execute(
            definition.id(),
            definition.name(),
            "automatic",
            definition.automatic_effects(),
        );
        self.complete(
            definition,
            dispatch,
            Resolution::Automatic,
            Some(summary),
            definition.description(),
        );
        None
    }

    fn complete(
        &mut self,
        definition: &EventDefinition,
        dispatch: Dispatch,
        resolution: Resolution,
        effects: Option<EffectExecutionSummary>,
        outcome_text: &str,
    ) {
        self.phase = EnginePhase::Completing;
        let day = self.today();

        if !outcome_text.is_empty() {
            let logged = self
                .world
                .journal()
                .and_then(|journal| journal.append(definition.name(), outcome_text));
            if let Err(error) = logged {
                tracing::warn!(event_id = %definition.id(), error = %error, "Outcome not journaled");
            }
        }

        self.triggered.insert(definition.id().clone(), true);

        let mut transitions = Vec::new();
        let mut completions = Vec::new();
        if definition.is_quest() {
            match self.quests.on_triggered(definition.id()) {
                Ok((started, completion)) => {
                    transitions.push(started);
                    completions.extend(completion);
                }
                Err(error) => {
                    tracing::warn!(event_id = %definition.id(), error = %error, "Quest did not start")
                }
            }
        }

        let mut scheduled = None;
        if let Some(follow_up) = definition.follow_up() {
            let target_day = follow_up.target_day(day);
            self.follow_ups.schedule(follow_up.event_id.clone(), target_day);
            tracing::info!(
                event_id = %definition.id(),
                follow_up = %follow_up.event_id,
                target_day = target_day,
                "Scheduled follow-up"
            );
            scheduled = Some(ScheduledEvent {
                event_id: follow_up.event_id.clone(),
                target_day,
            });
        }

        if let Some(report) = self.report.as_mut() {
            report.quest_transitions.extend(transitions);
            report.absorb_quest_completions(completions);
            report.scheduled.extend(scheduled);
        }
        self.record(DispatchRecord {
            event_id: dispatch.event_id,
            source: dispatch.source,
            resolution,
            effects,
        });
        self.phase = EnginePhase::Evaluating;
    }

    fn record(&mut self, record: DispatchRecord) {
        if let Some(report) = self.report.as_mut() {
            report.dispatches.push(record);
        }
    }

    fn describe_choice(&self, definition: &EventDefinition, ticket: ChoiceTicketId) -> PendingChoice {
        PendingChoice {
            ticket,
            event_id: definition.id().clone(),
            title: definition.name().to_string(),
            description: definition.description().to_string(),
            options: definition
                .choices()
                .iter()
                .enumerate()
                .map(|(index, choice)| ChoiceOption {
                    index,
                    text: choice.text.clone(),
                    affordable: self.requirements.can_afford(choice),
                    recommended: choice.recommended,
                })
                .collect(),
        }
    }
}

/// Follow-up ordering: priority descending, then authoring order.
fn rank(catalogue: &EventCatalogue, id: &EventId) -> (Reverse<EventPriority>, usize) {
    let priority = catalogue
        .get(id)
        .map(|d| d.priority())
        .unwrap_or(EventPriority::Low);
    let position = catalogue.position(id).unwrap_or(usize::MAX);
    (Reverse(priority), position)
}
