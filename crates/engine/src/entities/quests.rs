//! Quest tracker - quest status and objective progress.
//!
//! The tracker is the only writer of quest status. Definitions stay in the
//! catalogue; the tracker keeps a [`QuestRecord`] per quest id.

use std::collections::BTreeMap;
use std::sync::Arc;

use lastlight_domain::{
    DomainError, EventDefinition, EventId, GameDay, ObjectiveId, ObjectiveProgress,
    ObjectiveType, QuestRecord, QuestStatus,
};

use super::catalogue::EventCatalogue;
use super::effects::{EffectExecutionSummary, EffectExecutor};
use crate::infrastructure::ports::Collaborators;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuestError {
    #[error("Unknown quest: {0}")]
    UnknownQuest(EventId),

    #[error(transparent)]
    Transition(#[from] DomainError),
}

/// A completion together with the rewards it paid out.
pub type QuestCompletion = (QuestTransition, EffectExecutionSummary);

/// A status change, reported to the engine for its day report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestTransition {
    pub quest_id: EventId,
    pub from: QuestStatus,
    pub to: QuestStatus,
}

pub struct QuestTracker {
    catalogue: Arc<EventCatalogue>,
    executor: Arc<EffectExecutor>,
    world: Collaborators,
    records: BTreeMap<EventId, QuestRecord>,
}

impl QuestTracker {
    pub fn new(
        catalogue: Arc<EventCatalogue>,
        executor: Arc<EffectExecutor>,
        world: Collaborators,
    ) -> Self {
        let records = fresh_records(&catalogue);
        Self {
            catalogue,
            executor,
            world,
            records,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn get_quest(&self, id: &EventId) -> Option<&EventDefinition> {
        self.catalogue.get(id).filter(|d| d.is_quest())
    }

    pub fn status(&self, id: &EventId) -> Option<QuestStatus> {
        self.records.get(id).map(|r| r.status)
    }

    pub fn objective_progress(&self, id: &EventId) -> Option<&[ObjectiveProgress]> {
        self.records.get(id).map(|r| r.objectives.as_slice())
    }

    pub fn objective(&self, id: &EventId, objective: &ObjectiveId) -> Option<&ObjectiveProgress> {
        self.records.get(id)?.objective(objective)
    }

    pub fn available(&self) -> Vec<&EventDefinition> {
        self.with_status(QuestStatus::Available)
    }

    pub fn active(&self) -> Vec<&EventDefinition> {
        self.with_status(QuestStatus::InProgress)
    }

    pub fn completed(&self) -> Vec<&EventDefinition> {
        self.with_status(QuestStatus::Completed)
    }

    pub fn main_quests(&self) -> Vec<&EventDefinition> {
        self.catalogue.quests().filter(|d| d.is_main_quest()).collect()
    }

    pub fn side_quests(&self) -> Vec<&EventDefinition> {
        self.catalogue.quests().filter(|d| d.is_side_quest()).collect()
    }

    fn with_status(&self, status: QuestStatus) -> Vec<&EventDefinition> {
        self.catalogue
            .quests()
            .filter(|d| self.status(d.id()) == Some(status))
            .collect()
    }

    /// A chained quest is locked until every earlier link of its chain is Completed.
    pub fn is_unlocked(&self, definition: &EventDefinition) -> bool {
        let Some(link) = definition.quest().and_then(|q| q.chain.as_ref()) else {
            return true;
        };
        self.catalogue
            .quests()
            .filter_map(|other| {
                let other_link = other.quest()?.chain.as_ref()?;
                (other_link.chain_id == link.chain_id && other_link.order < link.order)
                    .then_some(other.id())
            })
            .all(|id| self.status(id) == Some(QuestStatus::Completed))
    }

    /// Whether the engine may dispatch this quest event (non-quests always may).
    pub fn can_start(&self, definition: &EventDefinition) -> bool {
        if !definition.is_quest() {
            return true;
        }
        matches!(
            self.status(definition.id()),
            Some(QuestStatus::NotStarted | QuestStatus::Available)
        ) && self.is_unlocked(definition)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// NotStarted/Available quests that are unlocked and in window become Available.
    pub fn refresh_availability(&mut self, day: GameDay) -> Vec<QuestTransition> {
        let ready: Vec<EventId> = self
            .catalogue
            .quests()
            .filter(|d| self.status(d.id()) == Some(QuestStatus::NotStarted))
            .filter(|d| d.window().contains(day) && self.is_unlocked(d))
            .map(|d| d.id().clone())
            .collect();

        let mut transitions = Vec::new();
        for id in ready {
            if let Some(record) = self.records.get_mut(&id) {
                if record.make_available() {
                    tracing::info!(quest_id = %id, day = day, "Quest available");
                    transitions.push(QuestTransition {
                        quest_id: id,
                        from: QuestStatus::NotStarted,
                        to: QuestStatus::Available,
                    });
                }
            }
        }
        transitions
    }

    /// NotStarted/Available → InProgress.
    ///
    /// A quest with no open objectives completes immediately; its completion
    /// is returned alongside the start transition.
    pub fn on_triggered(
        &mut self,
        id: &EventId,
    ) -> Result<(QuestTransition, Option<QuestCompletion>), QuestError> {
        let definition = self
            .get_quest(id)
            .ok_or_else(|| QuestError::UnknownQuest(id.clone()))?;
        let name = definition.name().to_string();
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| QuestError::UnknownQuest(id.clone()))?;

        let from = record.status;
        record.start()?;
        let finished = record.all_objectives_complete();

        tracing::info!(quest_id = %id, quest = %name, "Quest started");
        self.journal("Quest started", &name);

        let started = QuestTransition {
            quest_id: id.clone(),
            from,
            to: QuestStatus::InProgress,
        };
        let completion = if finished { self.on_completed(id)? } else { None };
        Ok((started, completion))
    }

    /// InProgress → Completed, paying out rewards exactly once.
    ///
    /// Returns `None` when the quest is already Completed.
    pub fn on_completed(
        &mut self,
        id: &EventId,
    ) -> Result<Option<QuestCompletion>, QuestError> {
        let definition = self
            .catalogue
            .get(id)
            .filter(|d| d.is_quest())
            .ok_or_else(|| QuestError::UnknownQuest(id.clone()))?;
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| QuestError::UnknownQuest(id.clone()))?;

        if record.status == QuestStatus::Completed {
            return Ok(None);
        }
        record.complete()?;

        let rewards = definition
            .quest()
            .map(|q| q.rewards.as_slice())
            .unwrap_or(&[]);
        let summary = self
            .executor
            .execute(id, definition.name(), "quest rewards", rewards);

        tracing::info!(
            quest_id = %id,
            quest = %definition.name(),
            rewards = rewards.len(),
            "Quest completed"
        );
        let name = definition.name().to_string();
        self.journal("Quest completed", &name);

        Ok(Some((
            QuestTransition {
                quest_id: id.clone(),
                from: QuestStatus::InProgress,
                to: QuestStatus::Completed,
            },
            summary,
        )))
    }

    /// External failure condition. Terminal quests cannot fail.
    pub fn fail_quest(&mut self, id: &EventId) -> Result<QuestTransition, QuestError> {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| QuestError::UnknownQuest(id.clone()))?;
        let from = record.status;
        record.fail()?;
        tracing::info!(quest_id = %id, from = ?from, "Quest failed");
        let name = self
            .catalogue
            .get(id)
            .map(|d| d.name().to_string())
            .unwrap_or_else(|| id.to_string());
        self.journal("Quest failed", &name);
        Ok(QuestTransition {
            quest_id: id.clone(),
            from,
            to: QuestStatus::Failed,
        })
    }

    /// Fan a gameplay signal out to every InProgress quest.
    ///
    /// Quests whose objectives are all complete are auto-completed; repeated
    /// signals after completion change nothing.
    pub fn update_progress(
        &mut self,
        objective_type: ObjectiveType,
        target_id: &str,
        amount: u32,
    ) -> Vec<QuestCompletion> {
        let mut finished = Vec::new();
        for definition in self.catalogue.quests() {
            let Some(spec) = definition.quest() else { continue };
            let Some(record) = self.records.get_mut(definition.id()) else {
                continue;
            };
            let changed = record.record_progress(spec, objective_type, target_id, amount);
            if changed > 0 {
                tracing::debug!(
                    quest_id = %definition.id(),
                    objective_type = ?objective_type,
                    target_id = target_id,
                    amount = amount,
                    "Quest progress"
                );
                if record.all_objectives_complete() {
                    finished.push(definition.id().clone());
                }
            }
        }

        let mut completions = Vec::new();
        for id in finished {
            match self.on_completed(&id) {
                Ok(Some(completion)) => completions.push(completion),
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(quest_id = %id, error = %error, "Failed to complete quest")
                }
            }
        }
        completions
    }

    /// Advance SurviveDays objectives of active quests by `days`.
    pub fn advance_survival_days(&mut self, days: u32) -> Vec<QuestCompletion> {
        self.update_progress(ObjectiveType::SurviveDays, "", days)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    pub fn records(&self) -> &BTreeMap<EventId, QuestRecord> {
        &self.records
    }

    /// Replace state from a save. Quests missing from the save start fresh;
    /// saved quests no longer in the catalogue are dropped.
    pub fn restore(&mut self, saved: &BTreeMap<EventId, QuestRecord>) {
        let mut records = fresh_records(&self.catalogue);
        for (id, saved_record) in saved {
            let Some(record) = records.get_mut(id) else {
                tracing::warn!(quest_id = %id, "Dropping saved quest not in catalogue");
                continue;
            };
            record.status = saved_record.status;
            for progress in record.objectives.iter_mut() {
                if let Some(saved_progress) = saved_record.objective(&progress.objective_id) {
                    *progress = saved_progress.clone();
                }
            }
        }
        self.records = records;
    }

    fn journal(&self, title: &str, text: &str) {
        let result = self.world.journal().and_then(|j| j.append(title, text));
        if let Err(error) = result {
            tracing::debug!(error = %error, "Quest journal entry skipped");
        }
    }
}

fn fresh_records(catalogue: &EventCatalogue) -> BTreeMap<EventId, QuestRecord> {
    catalogue
        .quests()
        .filter_map(|d| Some((d.id().clone(), QuestRecord::new(d.quest()?))))
        .collect()
}

#[cfg(test)]
mod tests {
    use lastlight_domain::{EventDefinitionRecord, EventEffect, QuestChainId, QuestObjective, ResourceKind};

    use super::*;
    use crate::infrastructure::clock::FixedRandom;
    use crate::infrastructure::memory::{InMemoryJournal, InMemoryResourcePool};
    use crate::infrastructure::ports::ResourcePoolPort;

    struct Fixture {
        tracker: QuestTracker,
        pool: Arc<InMemoryResourcePool>,
        journal: Arc<InMemoryJournal>,
    }

    fn quest(id: &str, objectives: Vec<QuestObjective>) -> EventDefinitionRecord {
        let mut record = EventDefinitionRecord::new(id);
        record.name = id.to_uppercase();
        record.is_main_quest = true;
        record.objectives = objectives;
        record.effects = vec![EventEffect::ModifyResource {
            kind: ResourceKind::Food,
            delta: 10,
        }];
        record
    }

    fn chained(id: &str, order: u32) -> EventDefinitionRecord {
        let mut record = quest(id, Vec::new());
        record.quest_chain_id = Some(QuestChainId::new("signal"));
        record.quest_chain_order = order;
        record
    }

    fn fixture(records: Vec<EventDefinitionRecord>) -> Fixture {
        let pool = Arc::new(InMemoryResourcePool::new());
        let journal = Arc::new(InMemoryJournal::new());
        let world = Collaborators::new()
            .with_resources(pool.clone())
            .with_journal(journal.clone());
        let executor = Arc::new(EffectExecutor::new(world.clone(), Arc::new(FixedRandom(0.0))));
        let catalogue = Arc::new(EventCatalogue::load(records));
        Fixture {
            tracker: QuestTracker::new(catalogue, executor, world),
            pool,
            journal,
        }
    }

    fn two_objective_quest() -> EventDefinitionRecord {
        quest(
            "q",
            vec![
                QuestObjective::new("a", ObjectiveType::CollectItem, "A", 3),
                QuestObjective::new("b", ObjectiveType::KillEnemies, "B", 1),
            ],
        )
    }

    #[test]
    fn completes_exactly_once_after_all_objectives() {
        let mut f = fixture(vec![two_objective_quest()]);
        let q = EventId::new("q");
        f.tracker.on_triggered(&q).unwrap();

        assert!(f.tracker.update_progress(ObjectiveType::CollectItem, "A", 3).is_empty());
        let done = f.tracker.update_progress(ObjectiveType::KillEnemies, "B", 1);
        assert_eq!(done.len(), 1);
        assert_eq!(f.tracker.status(&q), Some(QuestStatus::Completed));

        // Repeated identical signals change nothing and pay nothing.
        assert!(f.tracker.update_progress(ObjectiveType::KillEnemies, "B", 1).is_empty());
        assert!(f.tracker.update_progress(ObjectiveType::CollectItem, "A", 3).is_empty());
        assert!(f.tracker.on_completed(&q).unwrap().is_none());
        assert_eq!(f.pool.amount(ResourceKind::Food).unwrap(), 10);
    }

    #[test]
    fn progress_ignored_until_triggered() {
        let mut f = fixture(vec![two_objective_quest()]);
        f.tracker.update_progress(ObjectiveType::CollectItem, "A", 3);
        let q = EventId::new("q");
        assert_eq!(f.tracker.objective(&q, &ObjectiveId::new("a")).unwrap().progress, 0);
    }

    #[test]
    fn quest_without_objectives_completes_on_trigger() {
        let mut f = fixture(vec![quest("errand", Vec::new())]);
        let (started, completion) = f.tracker.on_triggered(&EventId::new("errand")).unwrap();
        assert_eq!(started.to, QuestStatus::InProgress);
        let (completed, rewards) = completion.unwrap();
        assert_eq!(completed.to, QuestStatus::Completed);
        assert_eq!(rewards.success_count, 1);
        assert_eq!(f.pool.amount(ResourceKind::Food).unwrap(), 10);
        let titles: Vec<String> = f.journal.entries().into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["Quest started", "Quest completed"]);
    }

    #[test]
    fn views_filter_by_status() {
        let mut f = fixture(vec![two_objective_quest(), quest("other", vec![QuestObjective::new("x", ObjectiveType::Custom, "x", 1)])]);
        f.tracker.refresh_availability(1);
        assert_eq!(f.tracker.available().len(), 2);
        f.tracker.on_triggered(&EventId::new("q")).unwrap();
        assert_eq!(f.tracker.available().len(), 1);
        assert_eq!(f.tracker.active().len(), 1);
        assert_eq!(f.tracker.main_quests().len(), 2);
        assert!(f.tracker.side_quests().is_empty());
    }

    #[test]
    fn chain_unlocks_in_order() {
        let mut f = fixture(vec![chained("first", 0), chained("second", 1)]);
        let second = EventId::new("second");
        let def = f.tracker.get_quest(&second).unwrap().clone();
        assert!(!f.tracker.is_unlocked(&def));
        assert!(!f.tracker.can_start(&def));

        f.tracker.refresh_availability(1);
        assert_eq!(f.tracker.status(&second), Some(QuestStatus::NotStarted));

        f.tracker.on_triggered(&EventId::new("first")).unwrap();
        assert!(f.tracker.can_start(&def));
        f.tracker.refresh_availability(2);
        assert_eq!(f.tracker.status(&second), Some(QuestStatus::Available));
    }

    #[test]
    fn fail_quest_is_terminal() {
        let mut f = fixture(vec![two_objective_quest()]);
        let q = EventId::new("q");
        f.tracker.on_triggered(&q).unwrap();
        let transition = f.tracker.fail_quest(&q).unwrap();
        assert_eq!(transition.to, QuestStatus::Failed);
        assert!(f.tracker.fail_quest(&q).is_err());
        assert!(f.tracker.on_triggered(&q).is_err());
        assert!(f.tracker.update_progress(ObjectiveType::KillEnemies, "B", 1).is_empty());
        assert_eq!(f.pool.amount(ResourceKind::Food).unwrap(), 0);
    }

    #[test]
    fn unknown_quest_is_an_error() {
        let mut f = fixture(vec![]);
        assert!(matches!(
            f.tracker.on_triggered(&EventId::new("nope")),
            Err(QuestError::UnknownQuest(_))
        ));
    }

    #[test]
    fn survive_days_objective_counts_days() {
        let mut f = fixture(vec![quest(
            "hold_out",
            vec![QuestObjective::new("days", ObjectiveType::SurviveDays, "", 2)],
        )]);
        let id = EventId::new("hold_out");
        f.tracker.on_triggered(&id).unwrap();
        assert!(f.tracker.advance_survival_days(1).is_empty());
        assert_eq!(f.tracker.advance_survival_days(1).len(), 1);
        assert_eq!(f.tracker.status(&id), Some(QuestStatus::Completed));
    }

    #[test]
    fn restore_replaces_records_and_ignores_unknown_quests() {
        let mut f = fixture(vec![two_objective_quest()]);
        let q = EventId::new("q");
        f.tracker.on_triggered(&q).unwrap();
        f.tracker.update_progress(ObjectiveType::CollectItem, "A", 2);
        let mut saved = f.tracker.records().clone();
        saved.insert(
            EventId::new("ghost"),
            QuestRecord {
                status: QuestStatus::Completed,
                objectives: Vec::new(),
            },
        );

        let mut g = fixture(vec![two_objective_quest()]);
        g.tracker.restore(&saved);
        assert_eq!(g.tracker.status(&q), Some(QuestStatus::InProgress));
        assert_eq!(g.tracker.objective(&q, &ObjectiveId::new("a")).unwrap().progress, 2);
        assert!(g.tracker.status(&EventId::new("ghost")).is_none());
    }
}
